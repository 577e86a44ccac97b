use super::context::{ContextAnalyzer, SymbolContext};
use super::framework::Framework;
use super::outline::{Document, OutlineKind, OutlineNode};
use super::symbol::{
    stable_symbol_id, Category, FrameworkInfo, FrontendKind, Priority, ReactInfo, SymbolForest,
    SymbolId, SymbolNode, VueInfo,
};

/// The six Vue composition-API lifecycle hooks recognized by classification
const VUE_LIFECYCLE_HOOKS: [&str; 6] = [
    "onBeforeMount",
    "onMounted",
    "onBeforeUpdate",
    "onUpdated",
    "onBeforeUnmount",
    "onUnmounted",
];

/// The six built-in React hooks that classify as `ReactHook`
const REACT_BUILTIN_HOOKS: [&str; 6] = [
    "useState",
    "useEffect",
    "useContext",
    "useReducer",
    "useCallback",
    "useMemo",
];

const SIGNATURE_MAX_CHARS: usize = 100;

/// Walks a raw outline forest and produces the enriched symbol forest.
///
/// Classification is an ordered rule cascade, first match wins. A node with
/// no matching rule is dropped together with its entire subtree — children
/// are never promoted past a dropped parent.
pub struct SymbolClassifier {
    framework: Framework,
    /// Whether the document as a whole uses the Vue composition API
    composition_api: bool,
}

impl SymbolClassifier {
    pub fn new(framework: Framework, document_text: &str) -> Self {
        let composition_api = framework == Framework::Vue
            && (document_text.contains("<script setup")
                || document_text.contains("setup(")
                || document_text.contains("ref(")
                || document_text.contains("reactive("));

        Self {
            framework,
            composition_api,
        }
    }

    /// Build the enriched forest for one document, depth-first, preserving
    /// the source outline's sibling order
    pub fn classify_forest(&self, outline: &[OutlineNode], document: &Document) -> SymbolForest {
        let analyzer = ContextAnalyzer::new(&document.text, self.framework);
        let lines = document.lines();
        let mut forest = SymbolForest::new(Some(document.path.clone()));

        for node in outline {
            self.classify_into(node, &lines, &analyzer, None, 0, &mut forest);
        }

        forest
    }

    fn classify_into(
        &self,
        node: &OutlineNode,
        lines: &[&str],
        analyzer: &ContextAnalyzer,
        parent: Option<SymbolId>,
        level: usize,
        forest: &mut SymbolForest,
    ) {
        let signature = extract_signature(node, lines);

        // No matching rule: the node and its whole subtree are dropped
        let Some(frontend_kind) = self.determine_kind(node, &signature) else {
            return;
        };

        let context = analyzer.analyze(&node.name);
        let symbol = self.enrich(node, frontend_kind, signature, &context, level);
        let id = forest.push(symbol, parent);

        for child in &node.children {
            self.classify_into(child, lines, analyzer, Some(id), level + 1, forest);
        }
    }

    /// Ordered rule cascade: framework-specific rules first, then the
    /// generic fallback that applies regardless of framework
    fn determine_kind(&self, node: &OutlineNode, signature: &str) -> Option<FrontendKind> {
        let framework_kind = match self.framework {
            Framework::Vue => self.classify_vue(node, signature),
            Framework::React => self.classify_react(node, signature),
            Framework::General => None,
        };

        framework_kind.or_else(|| self.classify_generic(node, signature))
    }

    fn classify_vue(&self, node: &OutlineNode, sig: &str) -> Option<FrontendKind> {
        if sig.contains("defineComponent") {
            return Some(FrontendKind::VueComponent);
        }
        if sig.contains("defineProps") {
            return Some(FrontendKind::VueProp);
        }
        if sig.contains("defineEmits") {
            return Some(FrontendKind::VueEmit);
        }
        if has_call(sig, "ref") || has_type(sig, "Ref") {
            return Some(FrontendKind::VueRef);
        }
        if has_call(sig, "reactive") || has_type(sig, "UnwrapRef") {
            return Some(FrontendKind::VueReactive);
        }
        if has_call(sig, "computed") || has_type(sig, "ComputedRef") {
            return Some(FrontendKind::VueComputed);
        }
        if has_call(sig, "watch") || has_call(sig, "watchEffect") {
            return Some(FrontendKind::VueWatch);
        }
        if VUE_LIFECYCLE_HOOKS
            .iter()
            .any(|hook| node.name == *hook || has_call(sig, hook))
        {
            return Some(FrontendKind::VueLifecycle);
        }
        if node.name.starts_with("use") && is_function_kind(node.kind) {
            return Some(FrontendKind::VueComposable);
        }
        None
    }

    fn classify_react(&self, node: &OutlineNode, sig: &str) -> Option<FrontendKind> {
        if node.name.starts_with("use") && is_function_kind(node.kind) {
            return if REACT_BUILTIN_HOOKS.contains(&node.name.as_str()) {
                Some(FrontendKind::ReactHook)
            } else {
                Some(FrontendKind::ReactCustomHook)
            };
        }
        if is_function_kind(node.kind)
            && node.name.chars().next().is_some_and(|c| c.is_uppercase())
        {
            return Some(FrontendKind::ReactComponent);
        }
        if has_call(sig, "useState") {
            return Some(FrontendKind::ReactState);
        }
        if has_call(sig, "useEffect") {
            return Some(FrontendKind::ReactEffect);
        }
        if has_call(sig, "useCallback") {
            return Some(FrontendKind::ReactCallback);
        }
        if has_call(sig, "useMemo") {
            return Some(FrontendKind::ReactMemo);
        }
        if has_call(sig, "useRef") {
            return Some(FrontendKind::ReactRef);
        }
        if has_call(sig, "useContext") {
            return Some(FrontendKind::ReactContext);
        }
        if has_call(sig, "useReducer") {
            return Some(FrontendKind::ReactReducer);
        }
        None
    }

    fn classify_generic(&self, node: &OutlineNode, sig: &str) -> Option<FrontendKind> {
        let name = node.name.as_str();
        let name_lower = name.to_lowercase();

        if name.starts_with("on")
            || name.starts_with("handle")
            || name.contains("Click")
            || name.contains("Change")
        {
            return Some(FrontendKind::EventHandler);
        }
        if ["api", "fetch", "request", "get", "post"]
            .iter()
            .any(|marker| name_lower.contains(marker))
        {
            return Some(FrontendKind::ApiCall);
        }
        if ["style", "css", "theme"]
            .iter()
            .any(|marker| name_lower.contains(marker))
        {
            return Some(FrontendKind::StyleDef);
        }
        if sig.contains("=>") {
            return if sig.contains("async") {
                Some(FrontendKind::AsyncFunction)
            } else {
                Some(FrontendKind::ArrowFunction)
            };
        }
        if sig.contains("async") {
            return Some(FrontendKind::AsyncFunction);
        }
        if node.kind == OutlineKind::Class {
            return Some(FrontendKind::ClassDef);
        }
        if node.kind == OutlineKind::Interface || node.kind == OutlineKind::TypeAlias {
            return Some(FrontendKind::TypeDef);
        }
        if node.kind == OutlineKind::Constant
            || (node.kind == OutlineKind::Variable && is_upper_snake(name))
        {
            return Some(FrontendKind::Constant);
        }
        if is_function_kind(node.kind) {
            // Default function bucket
            return Some(FrontendKind::ArrowFunction);
        }
        None
    }

    fn enrich(
        &self,
        node: &OutlineNode,
        frontend_kind: FrontendKind,
        signature: String,
        context: &SymbolContext,
        level: usize,
    ) -> SymbolNode {
        let is_async = signature.contains("async");
        let is_private = node.name.starts_with('_') || signature.contains("private ");
        let is_exported = signature.contains("export ");

        let category = frontend_kind.category();
        let priority = frontend_kind.priority();
        let tags = build_tags(category, is_async, is_private, is_exported);

        SymbolNode {
            id: stable_symbol_id(&node.name, node.range.start.line),
            name: node.name.clone(),
            range: node.range,
            kind: node.kind,
            frontend_kind,
            framework: self.framework,
            priority,
            parameters: extract_parameters(&signature),
            return_type: extract_return_type(&signature),
            signature,
            is_async,
            is_private,
            is_exported,
            used_in_template: context.used_in_template,
            used_in_events: context.used_in_events,
            reference_count: context.reference_count,
            usage_frequency: None,
            category,
            tags,
            complexity: complexity_from_span(node.range.line_span()),
            level,
            parent: None,
            children: Vec::new(),
            info: self.framework_payload(frontend_kind, node, context),
        }
    }

    fn framework_payload(
        &self,
        kind: FrontendKind,
        node: &OutlineNode,
        context: &SymbolContext,
    ) -> Option<FrameworkInfo> {
        match self.framework {
            Framework::Vue => {
                let reactive_type = match kind {
                    FrontendKind::VueRef => Some("ref".to_string()),
                    FrontendKind::VueReactive => Some("reactive".to_string()),
                    FrontendKind::VueComputed => Some("computed".to_string()),
                    _ => None,
                };
                let component_type = (kind == FrontendKind::VueComponent).then(|| {
                    if self.composition_api {
                        "composition".to_string()
                    } else {
                        "options".to_string()
                    }
                });

                let vue_specific = matches!(
                    kind,
                    FrontendKind::VueComponent
                        | FrontendKind::VueComposable
                        | FrontendKind::VueRef
                        | FrontendKind::VueReactive
                        | FrontendKind::VueComputed
                        | FrontendKind::VueWatch
                        | FrontendKind::VueLifecycle
                        | FrontendKind::VueProp
                        | FrontendKind::VueEmit
                );
                if !vue_specific && context.template_bindings.is_empty() {
                    return None;
                }

                Some(FrameworkInfo::Vue(VueInfo {
                    is_composition_api: self.composition_api,
                    reactive_type,
                    component_type,
                    template_bindings: context.template_bindings.clone(),
                }))
            }
            Framework::React => {
                let hook_type = match kind {
                    FrontendKind::ReactHook => Some(node.name.clone()),
                    FrontendKind::ReactCustomHook => Some("custom".to_string()),
                    FrontendKind::ReactState => Some("useState".to_string()),
                    FrontendKind::ReactEffect => Some("useEffect".to_string()),
                    FrontendKind::ReactCallback => Some("useCallback".to_string()),
                    FrontendKind::ReactMemo => Some("useMemo".to_string()),
                    FrontendKind::ReactRef => Some("useRef".to_string()),
                    FrontendKind::ReactContext => Some("useContext".to_string()),
                    FrontendKind::ReactReducer => Some("useReducer".to_string()),
                    _ => None,
                };
                let component_type = (kind == FrontendKind::ReactComponent).then(|| {
                    if node.kind == OutlineKind::Class {
                        "class".to_string()
                    } else {
                        "function".to_string()
                    }
                });

                if hook_type.is_none() && component_type.is_none() {
                    return None;
                }

                Some(FrameworkInfo::React(ReactInfo {
                    component_type,
                    hook_type,
                }))
            }
            Framework::General => None,
        }
    }
}

/// The raw source line spanning the node's start position, trimmed and
/// truncated to 100 characters with an ellipsis marker. A start line outside
/// the document falls back to the bare symbol name.
fn extract_signature(node: &OutlineNode, lines: &[&str]) -> String {
    let Some(line) = lines.get(node.range.start.line) else {
        return node.name.clone();
    };
    let trimmed = line.trim();
    if trimmed.chars().count() > SIGNATURE_MAX_CHARS {
        let truncated: String = trimmed.chars().take(SIGNATURE_MAX_CHARS).collect();
        format!("{truncated}...")
    } else {
        trimmed.to_string()
    }
}

/// Ordered parameter strings from the first balanced `( ... )` group
fn extract_parameters(signature: &str) -> Vec<String> {
    let Some(open) = signature.find('(') else {
        return Vec::new();
    };

    let mut depth = 0usize;
    let mut close = None;
    for (idx, ch) in signature[open..].char_indices() {
        match ch {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && ch == ')' {
                    close = Some(open + idx);
                    break;
                }
            }
            _ => {}
        }
    }

    let Some(close) = close else {
        return Vec::new();
    };
    let body = &signature[open + 1..close];
    if body.trim().is_empty() {
        return Vec::new();
    }

    // Split on top-level commas only
    let mut params = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in body.chars() {
        match ch {
            '(' | '[' | '{' | '<' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' | '}' | '>' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                params.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        params.push(current.trim().to_string());
    }
    params
}

/// `: Type` suffix after the parameter list, up to `=>`, `{`, or `=`
fn extract_return_type(signature: &str) -> Option<String> {
    let close = signature.rfind(')')?;
    let after = &signature[close + 1..];
    let colon = after.find(':')?;
    let mut ty = &after[colon + 1..];
    for terminator in ["=>", "{", "="] {
        if let Some(pos) = ty.find(terminator) {
            ty = &ty[..pos];
        }
    }
    let ty = ty.trim();
    (!ty.is_empty()).then(|| ty.to_string())
}

/// Fixed tag rule set; each tag is appended independently when its
/// condition holds
fn build_tags(category: Category, is_async: bool, is_private: bool, is_exported: bool) -> Vec<String> {
    let mut tags = Vec::new();
    if category == Category::Component {
        tags.push("component".to_string());
    }
    if is_async {
        tags.push("async".to_string());
    }
    if is_private {
        tags.push("private".to_string());
    }
    if is_exported {
        tags.push("exported".to_string());
    }
    if category == Category::Api {
        tags.push("api".to_string());
    }
    if category == Category::Utility {
        tags.push("utility".to_string());
    }
    tags
}

fn complexity_from_span(line_span: usize) -> u8 {
    match line_span {
        0..=5 => 1,
        6..=15 => 2,
        16..=30 => 3,
        _ => 4,
    }
}

fn is_function_kind(kind: OutlineKind) -> bool {
    kind == OutlineKind::Function || kind == OutlineKind::Method
}

fn is_upper_snake(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        && name.chars().any(|c| c.is_ascii_uppercase())
}

/// `token(` preceded by a non-identifier character (or start of string)
fn has_call(signature: &str, token: &str) -> bool {
    has_bounded(signature, token, '(')
}

/// `Token<` preceded by a non-identifier character (or start of string)
fn has_type(signature: &str, token: &str) -> bool {
    has_bounded(signature, token, '<')
}

fn has_bounded(signature: &str, token: &str, suffix: char) -> bool {
    let needle = format!("{token}{suffix}");
    let mut search_from = 0;
    while let Some(pos) = signature[search_from..].find(&needle) {
        let absolute = search_from + pos;
        let preceded_by_ident = signature[..absolute]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_');
        if !preceded_by_ident {
            return true;
        }
        search_from = absolute + 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outline::{Position, SourceRange};

    fn node(name: &str, kind: OutlineKind, line: usize) -> OutlineNode {
        OutlineNode::new(
            name,
            kind,
            SourceRange::new(Position::new(line, 0), Position::new(line, 0)),
        )
    }

    fn doc(path: &str, text: &str) -> Document {
        Document::new(path, text)
    }

    #[test]
    fn vue_ref_and_event_handler_scenario() {
        let text = "const count = ref(0)\nfunction onClick() {}\n";
        let document = doc("Foo.vue", text);
        let classifier = SymbolClassifier::new(Framework::Vue, text);

        let outline = vec![
            node("count", OutlineKind::Variable, 0),
            node("onClick", OutlineKind::Function, 1),
        ];
        let forest = classifier.classify_forest(&outline, &document);

        assert_eq!(forest.len(), 2);
        let count = forest.get(forest.roots()[0]).unwrap();
        assert_eq!(count.frontend_kind, FrontendKind::VueRef);
        assert_eq!(count.priority, Priority::Low);

        let on_click = forest.get(forest.roots()[1]).unwrap();
        assert_eq!(on_click.frontend_kind, FrontendKind::EventHandler);
        assert_eq!(on_click.priority, Priority::Medium);
    }

    #[test]
    fn computed_ref_annotation_is_not_a_plain_ref() {
        let text = "const total: ComputedRef<number> = computed(() => n.value * 2)\n";
        let classifier = SymbolClassifier::new(Framework::Vue, text);
        let forest =
            classifier.classify_forest(&[node("total", OutlineKind::Variable, 0)], &doc("a.vue", text));
        assert_eq!(
            forest.get(forest.roots()[0]).unwrap().frontend_kind,
            FrontendKind::VueComputed
        );
    }

    #[test]
    fn react_hook_rules() {
        let text = "function useState() {}\nfunction useCart() {}\nfunction Cart() {}\nconst [n, setN] = useState(0)\n";
        let classifier = SymbolClassifier::new(Framework::React, text);
        let outline = vec![
            node("useState", OutlineKind::Function, 0),
            node("useCart", OutlineKind::Function, 1),
            node("Cart", OutlineKind::Function, 2),
            node("n", OutlineKind::Variable, 3),
        ];
        let forest = classifier.classify_forest(&outline, &doc("Cart.tsx", text));
        let kinds: Vec<_> = forest
            .roots()
            .iter()
            .map(|id| forest.get(*id).unwrap().frontend_kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                FrontendKind::ReactHook,
                FrontendKind::ReactCustomHook,
                FrontendKind::ReactComponent,
                FrontendKind::ReactState,
            ]
        );
    }

    #[test]
    fn unmatched_nodes_are_dropped_with_their_subtree() {
        let text = "const data = {}\nfunction helper() {}\n";
        let classifier = SymbolClassifier::new(Framework::General, text);

        let mut parent = node("data", OutlineKind::Variable, 0);
        parent.children.push(node("helper", OutlineKind::Function, 1));

        let forest = classifier.classify_forest(&[parent], &doc("a.js", text));
        // `data` matches no rule; `helper` must not be promoted
        assert!(forest.is_empty());
    }

    #[test]
    fn classification_is_order_independent() {
        let text = "const count = ref(0)\nfunction onClick() {}\nasync function fetchUser() {}\n";
        let document = doc("Foo.vue", text);
        let classifier = SymbolClassifier::new(Framework::Vue, text);

        let forward = vec![
            node("count", OutlineKind::Variable, 0),
            node("onClick", OutlineKind::Function, 1),
            node("fetchUser", OutlineKind::Function, 2),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let collect = |outline: &[OutlineNode]| {
            let forest = classifier.classify_forest(outline, &document);
            let mut pairs: Vec<_> = forest
                .iter()
                .map(|(_, s)| (s.name.clone(), s.frontend_kind, s.priority))
                .collect();
            pairs.sort();
            pairs
        };

        assert_eq!(collect(&forward), collect(&reversed));
    }

    #[test]
    fn signature_extraction_truncates_and_recovers() {
        let long_line = format!("function f() {{ {} }}", "x".repeat(200));
        let lines: Vec<&str> = long_line.lines().collect();
        let sig = extract_signature(&node("f", OutlineKind::Function, 0), &lines);
        assert!(sig.ends_with("..."));
        assert_eq!(sig.chars().count(), SIGNATURE_MAX_CHARS + 3);

        // Start line outside the document falls back to the bare name
        let sig = extract_signature(&node("ghost", OutlineKind::Function, 99), &lines);
        assert_eq!(sig, "ghost");
    }

    #[test]
    fn parameters_and_return_type_parsing() {
        let params = extract_parameters("function load(id: string, opts: { deep: boolean }): Promise<User> {");
        assert_eq!(params, vec!["id: string", "opts: { deep: boolean }"]);
        assert_eq!(
            extract_return_type("function load(id: string): Promise<User> {"),
            Some("Promise<User>".to_string())
        );
        assert_eq!(extract_return_type("function go() {"), None);
    }

    #[test]
    fn tags_follow_the_fixed_rule_set() {
        let text = "export async function fetchUser() {}\n";
        let classifier = SymbolClassifier::new(Framework::General, text);
        let forest = classifier.classify_forest(
            &[node("fetchUser", OutlineKind::Function, 0)],
            &doc("api.js", text),
        );
        let symbol = forest.get(forest.roots()[0]).unwrap();
        assert_eq!(symbol.frontend_kind, FrontendKind::ApiCall);
        assert!(symbol.has_tag("api"));
        assert!(symbol.has_tag("async"));
        assert!(symbol.has_tag("exported"));
        assert!(!symbol.has_tag("private"));
    }
}
