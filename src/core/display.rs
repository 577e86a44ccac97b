use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::DisplayConfig;

use super::grouping::GroupDefinition;
use super::outline::{Position, SourceRange};
use super::symbol::{FrameworkInfo, SymbolForest, SymbolId, SymbolNode};

/// Presentation-ready header for one group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupHeader {
    /// Display label with computed count suffix, e.g. `响应式数据 (3)`
    pub label: String,
    pub icon: String,
    pub color: String,
    pub default_expanded: bool,
}

/// Presentation-ready metadata for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolDisplay {
    /// Glyph-decorated label, e.g. `🟢 ⚡ fetchUser`
    pub label: String,
    /// `Line N · <kind display name>`
    pub description: String,
    /// Multi-line hover text
    pub tooltip: String,
    pub navigation: NavigationTarget,
}

/// Where to jump when the symbol is activated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationTarget {
    pub path: PathBuf,
    /// Selection spanning the declaration line
    pub range: SourceRange,
}

/// Renders groups and symbols into the labels, descriptions, tooltips, and
/// navigation targets the presentation surface consumes
pub struct SymbolPresenter {
    display: DisplayConfig,
}

impl SymbolPresenter {
    pub fn new(display: &DisplayConfig) -> Self {
        Self {
            display: display.clone(),
        }
    }

    pub fn group_header(&self, definition: &GroupDefinition, count: usize) -> GroupHeader {
        let label = if self.display.show_counts {
            format!("{} ({})", definition.name, count)
        } else {
            definition.name.clone()
        };
        GroupHeader {
            label,
            icon: definition.icon.clone(),
            color: definition.color.clone(),
            default_expanded: definition.default_expanded,
        }
    }

    pub fn symbol_display(&self, forest: &SymbolForest, id: SymbolId) -> Option<SymbolDisplay> {
        let symbol = forest.get(id)?;
        Some(SymbolDisplay {
            label: self.label(symbol),
            description: description(symbol),
            tooltip: tooltip(symbol),
            navigation: navigation(forest, symbol),
        })
    }

    fn label(&self, symbol: &SymbolNode) -> String {
        if !self.display.show_glyphs {
            return symbol.name.clone();
        }

        let mut parts = vec![symbol.priority.glyph().to_string()];
        if symbol.is_async {
            parts.push("⚡".to_string());
        }
        if symbol.is_exported {
            parts.push("📤".to_string());
        }
        if symbol.is_private {
            parts.push("🔒".to_string());
        }
        if symbol.used_in_template {
            parts.push("📄".to_string());
        }
        parts.push(symbol.name.clone());
        parts.join(" ")
    }
}

fn description(symbol: &SymbolNode) -> String {
    format!(
        "Line {} · {}",
        symbol.range.start.line + 1,
        symbol.frontend_kind.display_name()
    )
}

fn tooltip(symbol: &SymbolNode) -> String {
    let mut lines = Vec::new();
    lines.push(format!("**{}**", symbol.name));
    lines.push(format!("类型: {}", symbol.frontend_kind.display_name()));
    lines.push(format!("优先级: {}", symbol.priority.display_name()));
    lines.push(format!("框架: {}", symbol.framework.display_name()));

    let mut attributes = Vec::new();
    if symbol.is_async {
        attributes.push("async");
    }
    if symbol.is_exported {
        attributes.push("exported");
    }
    if symbol.is_private {
        attributes.push("private");
    }
    if !attributes.is_empty() {
        lines.push(format!("属性: {}", attributes.join(", ")));
    }

    let mut usage = Vec::new();
    if symbol.used_in_template {
        usage.push("模板引用".to_string());
    }
    if symbol.used_in_events {
        usage.push("事件绑定".to_string());
    }
    usage.push(format!("引用 {} 次", symbol.reference_count));
    lines.push(format!("使用: {}", usage.join(" · ")));

    if !symbol.tags.is_empty() {
        lines.push(format!("标签: {}", symbol.tags.join(", ")));
    }

    lines.push(format!("签名: {}", symbol.signature));
    if !symbol.parameters.is_empty() {
        lines.push(format!("参数: {}", symbol.parameters.join(", ")));
    }
    if let Some(return_type) = &symbol.return_type {
        lines.push(format!("返回: {}", return_type));
    }
    lines.push(format!("复杂度: {}/4", symbol.complexity));
    if !symbol.children.is_empty() {
        lines.push(format!("子符号: {}", symbol.children.len()));
    }
    if let Some(FrameworkInfo::Vue(info)) = &symbol.info {
        if !info.template_bindings.is_empty() {
            lines.push(format!("模板绑定: {}", info.template_bindings.join(", ")));
        }
    }

    lines.join("\n")
}

fn navigation(forest: &SymbolForest, symbol: &SymbolNode) -> NavigationTarget {
    let line = symbol.range.start.line;
    NavigationTarget {
        path: forest.document.clone().unwrap_or_default(),
        range: SourceRange::new(
            Position::new(line, 0),
            Position::new(line, symbol.signature.chars().count()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::SymbolClassifier;
    use crate::core::framework::Framework;
    use crate::core::grouping::GroupEngine;
    use crate::core::outline::{Document, OutlineKind, OutlineNode};

    #[test]
    fn labels_and_descriptions() {
        let text = "export async function fetchUser() {}\n";
        let outline = vec![OutlineNode::new(
            "fetchUser",
            OutlineKind::Function,
            SourceRange::new(Position::new(0, 0), Position::new(0, 30)),
        )];
        let forest = SymbolClassifier::new(Framework::General, text)
            .classify_forest(&outline, &Document::new("api.js", text));

        let presenter = SymbolPresenter::new(&crate::config::Config::default().display);
        let display = presenter.symbol_display(&forest, forest.roots()[0]).unwrap();

        assert!(display.label.contains("fetchUser"));
        assert!(display.label.contains('⚡'));
        assert!(display.label.contains("📤"));
        assert_eq!(display.description, "Line 1 · 接口请求");
        assert!(display.tooltip.contains("签名: export async function fetchUser() {}"));
        assert_eq!(display.navigation.range.start.line, 0);
    }

    #[test]
    fn group_header_appends_count() {
        let engine = GroupEngine::new(Framework::Vue);
        let definition = engine.config().groups().first().unwrap().clone();
        let presenter = SymbolPresenter::new(&crate::config::Config::default().display);
        let header = presenter.group_header(&definition, 3);
        assert!(header.label.ends_with("(3)"));
    }
}
