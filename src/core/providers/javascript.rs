use std::sync::Mutex;

use async_trait::async_trait;
use tree_sitter::{Node, Parser};

use crate::core::outline::{
    Document, OutlineKind, OutlineNode, OutlineProvider, Position, SourceRange,
};
use crate::error::{Result, SymscopeError};

/// Tree-sitter outline provider for JavaScript/TypeScript sources and Vue
/// single-file components.
///
/// For `.vue` files the first `<script>` block is extracted and parsed with
/// line offsets preserved, so outline ranges always address the full
/// document. Template and style blocks contribute no outline nodes.
pub struct TreeSitterProvider {
    javascript: Mutex<Parser>,
    typescript: Mutex<Parser>,
    tsx: Mutex<Parser>,
}

impl TreeSitterProvider {
    pub fn new() -> Result<Self> {
        Ok(Self {
            javascript: Mutex::new(make_parser(&tree_sitter_javascript::language())?),
            typescript: Mutex::new(make_parser(&tree_sitter_typescript::language_typescript())?),
            tsx: Mutex::new(make_parser(&tree_sitter_typescript::language_tsx())?),
        })
    }

    fn parse_source(
        &self,
        parser: &Mutex<Parser>,
        source: &str,
        line_offset: usize,
    ) -> Result<Vec<OutlineNode>> {
        let mut parser = parser
            .lock()
            .map_err(|_| SymscopeError::Provider("parser lock poisoned".to_string()))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| SymscopeError::Provider("failed to parse source".to_string()))?;

        let mut nodes = Vec::new();
        collect_items(tree.root_node(), source, line_offset, &mut nodes);
        Ok(nodes)
    }

    fn outline_vue(&self, document: &Document) -> Result<Vec<OutlineNode>> {
        let Some(block) = extract_script_block(&document.text) else {
            // A .vue file without a script block has no symbols
            return Ok(Vec::new());
        };

        let parser = if block.is_typescript {
            &self.typescript
        } else {
            &self.javascript
        };
        self.parse_source(parser, block.content, block.line_offset)
    }
}

#[async_trait]
impl OutlineProvider for TreeSitterProvider {
    async fn outline(&self, document: &Document) -> Result<Vec<OutlineNode>> {
        let extension = document
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "vue" => self.outline_vue(document),
            "ts" => self.parse_source(&self.typescript, &document.text, 0),
            "tsx" => self.parse_source(&self.tsx, &document.text, 0),
            "js" | "jsx" | "mjs" | "cjs" => self.parse_source(&self.javascript, &document.text, 0),
            other => Err(SymscopeError::UnsupportedFile(other.to_string())),
        }
    }

    fn file_extensions(&self) -> &[&str] {
        &["vue", "js", "jsx", "ts", "tsx", "mjs", "cjs"]
    }

    fn provider_name(&self) -> &str {
        "tree-sitter"
    }
}

fn make_parser(language: &tree_sitter::Language) -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(language)
        .map_err(|e| SymscopeError::Provider(format!("Failed to set language: {}", e)))?;
    Ok(parser)
}

struct ScriptBlock<'a> {
    content: &'a str,
    /// Lines preceding the script content in the full document
    line_offset: usize,
    is_typescript: bool,
}

/// Locate the first `<script ...>` block of a Vue single-file component
fn extract_script_block(text: &str) -> Option<ScriptBlock<'_>> {
    let open = text.find("<script")?;
    let tag_end = open + text[open..].find('>')?;
    let attrs = &text[open..tag_end];
    let content_start = tag_end + 1;
    let close = content_start + text[content_start..].find("</script>")?;

    Some(ScriptBlock {
        content: &text[content_start..close],
        line_offset: text[..content_start].matches('\n').count(),
        is_typescript: attrs.contains("lang=\"ts\"") || attrs.contains("lang='ts'"),
    })
}

/// Walk the AST and extract outline items. Unknown node kinds are recursed
/// into so exported and nested declarations are still discovered.
fn collect_items(node: Node, source: &str, line_offset: usize, out: &mut Vec<OutlineNode>) {
    let mut cursor = node.walk();

    for child in node.children(&mut cursor) {
        match child.kind() {
            "class_declaration" | "abstract_class_declaration" => {
                if let Some(class) = parse_class(child, source, line_offset) {
                    out.push(class);
                }
            }
            "function_declaration" | "generator_function_declaration" => {
                if let Some(function) =
                    named_node(child, source, OutlineKind::Function, line_offset)
                {
                    out.push(function);
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                parse_declarators(child, source, line_offset, out);
            }
            "interface_declaration" => {
                if let Some(interface) =
                    named_node(child, source, OutlineKind::Interface, line_offset)
                {
                    out.push(interface);
                }
            }
            "type_alias_declaration" => {
                if let Some(alias) = named_node(child, source, OutlineKind::TypeAlias, line_offset)
                {
                    out.push(alias);
                }
            }
            "enum_declaration" => {
                if let Some(item) = named_node(child, source, OutlineKind::Enum, line_offset) {
                    out.push(item);
                }
            }
            "export_statement" => {
                // Exported declarations live one level down
                collect_items(child, source, line_offset, out);
            }
            _ => {
                collect_items(child, source, line_offset, out);
            }
        }
    }
}

/// Parse a class declaration with its methods and fields as children
fn parse_class(node: Node, source: &str, line_offset: usize) -> Option<OutlineNode> {
    let mut class = named_node(node, source, OutlineKind::Class, line_offset)?;

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            match member.kind() {
                "method_definition" => {
                    if let Some(method) =
                        named_node(member, source, OutlineKind::Method, line_offset)
                    {
                        class.children.push(method);
                    }
                }
                "public_field_definition" | "field_definition" => {
                    if let Some(field) =
                        named_node(member, source, OutlineKind::Property, line_offset)
                    {
                        class.children.push(field);
                    }
                }
                _ => {}
            }
        }
    }

    Some(class)
}

/// Expand a variable/lexical declaration into one outline node per
/// declarator. Function-valued declarators report as functions so
/// classification treats `const useCart = () => {}` like a declared function.
fn parse_declarators(node: Node, source: &str, line_offset: usize, out: &mut Vec<OutlineNode>) {
    let mut cursor = node.walk();

    for child in node.children(&mut cursor) {
        if child.kind() != "variable_declarator" {
            continue;
        }
        let Some(name_node) = child.child_by_field_name("name") else {
            continue;
        };
        let name = node_text(name_node, source);

        let value_kind = child.child_by_field_name("value").map(|value| value.kind());
        let kind = match value_kind {
            Some("arrow_function") | Some("function_expression") | Some("function") => {
                OutlineKind::Function
            }
            _ if is_const_case(&name) => OutlineKind::Constant,
            _ => OutlineKind::Variable,
        };

        out.push(OutlineNode::new(name, kind, node_range(node, line_offset)));
    }
}

fn named_node(
    node: Node,
    source: &str,
    kind: OutlineKind,
    line_offset: usize,
) -> Option<OutlineNode> {
    let name_node = node.child_by_field_name("name")?;
    Some(OutlineNode::new(
        node_text(name_node, source),
        kind,
        node_range(node, line_offset),
    ))
}

fn node_text(node: Node, source: &str) -> String {
    source[node.byte_range()].to_string()
}

fn node_range(node: Node, line_offset: usize) -> SourceRange {
    SourceRange::new(
        Position::new(node.start_position().row + line_offset, node.start_position().column),
        Position::new(node.end_position().row + line_offset, node.end_position().column),
    )
}

fn is_const_case(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        && name.chars().any(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline_of(path: &str, text: &str) -> Vec<OutlineNode> {
        let provider = TreeSitterProvider::new().unwrap();
        let document = Document::new(path, text);
        tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(provider.outline(&document))
            .unwrap()
    }

    #[test]
    fn javascript_functions_and_classes() {
        let text = "function add(a, b) { return a + b }\nclass Store {\n  load() {}\n}\nconst MAX_SIZE = 10\nconst onSave = () => {}\n";
        let outline = outline_of("store.js", text);

        let names: Vec<&str> = outline.iter().map(|n| n.name.as_str()).collect();
        assert!(names.contains(&"add"));
        assert!(names.contains(&"Store"));
        assert!(names.contains(&"MAX_SIZE"));
        assert!(names.contains(&"onSave"));

        let store = outline.iter().find(|n| n.name == "Store").unwrap();
        assert_eq!(store.kind, OutlineKind::Class);
        assert_eq!(store.children.len(), 1);
        assert_eq!(store.children[0].kind, OutlineKind::Method);

        let max = outline.iter().find(|n| n.name == "MAX_SIZE").unwrap();
        assert_eq!(max.kind, OutlineKind::Constant);
        let on_save = outline.iter().find(|n| n.name == "onSave").unwrap();
        assert_eq!(on_save.kind, OutlineKind::Function);
    }

    #[test]
    fn vue_script_block_keeps_document_lines() {
        let text = "<template>\n  <div>{{ count }}</div>\n</template>\n<script setup>\nconst count = ref(0)\n</script>\n";
        let outline = outline_of("Counter.vue", text);

        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].name, "count");
        // `const count` sits on the fifth line of the full document
        assert_eq!(outline[0].range.start.line, 4);
    }

    #[test]
    fn vue_without_script_block_has_no_symbols() {
        let outline = outline_of("Empty.vue", "<template><div /></template>\n");
        assert!(outline.is_empty());
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let provider = TreeSitterProvider::new().unwrap();
        let document = Document::new("styles.css", ".a { color: red }");
        let result = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(provider.outline(&document));
        assert!(result.is_err());
    }
}
