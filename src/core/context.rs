use regex::Regex;

use super::framework::Framework;

/// Per-symbol usage context derived from the document text
#[derive(Debug, Clone, Default)]
pub struct SymbolContext {
    pub used_in_template: bool,
    pub used_in_events: bool,
    pub reference_count: usize,
    /// Template mustache expressions that reference the symbol (Vue only)
    pub template_bindings: Vec<String>,
}

/// Computes usage context (template usage, event usage, reference counts)
/// for symbols of one document.
///
/// Detection is plain substring matching without identifier-boundary or
/// string/comment exclusion (except reference counting, which is whole-word).
/// Short common names can therefore false-positive; this is a documented
/// heuristic limitation, not a bug.
pub struct ContextAnalyzer {
    framework: Framework,
    text: String,
    /// Text between the first `<template>`...`</template>` pair (Vue)
    template_section: Option<String>,
    /// Captured `return ( ... )` block bodies (React)
    jsx_returns: Vec<String>,
    mustache_re: Regex,
}

impl ContextAnalyzer {
    pub fn new(text: &str, framework: Framework) -> Self {
        let template_section = match framework {
            Framework::Vue => extract_template_section(text),
            _ => None,
        };

        let jsx_returns = match framework {
            Framework::React => extract_return_blocks(text),
            _ => Vec::new(),
        };

        Self {
            framework,
            text: text.to_string(),
            template_section,
            jsx_returns,
            // {{ binding }} and {{ binding.path }} expressions
            mustache_re: Regex::new(r"\{\{\s*([^}]+?)\s*\}\}").expect("static regex"),
        }
    }

    /// Compute the usage context for one symbol name
    pub fn analyze(&self, name: &str) -> SymbolContext {
        let template_bindings = self.template_bindings(name);
        SymbolContext {
            used_in_template: self.used_in_template(name, &template_bindings),
            used_in_events: self.used_in_events(name),
            reference_count: self.reference_count(name),
            template_bindings,
        }
    }

    fn used_in_template(&self, name: &str, bindings: &[String]) -> bool {
        match self.framework {
            Framework::Vue => {
                if !bindings.is_empty() {
                    return true;
                }
                self.template_section
                    .as_deref()
                    .is_some_and(|section| section.contains(name))
            }
            Framework::React => self.jsx_returns.iter().any(|block| block.contains(name)),
            Framework::General => false,
        }
    }

    fn used_in_events(&self, name: &str) -> bool {
        // Fixed textual pattern set, matched verbatim against the document
        let patterns = [
            format!("@click=\"{name}\""),
            format!("@change=\"{name}\""),
            format!("@input=\"{name}\""),
            format!("@submit=\"{name}\""),
            format!("v-on:click=\"{name}\""),
            format!("onClick={{{name}}}"),
            format!("onChange={{{name}}}"),
            format!("onInput={{{name}}}"),
            format!("onSubmit={{{name}}}"),
            format!(".addEventListener('click', {name})"),
            format!(".addEventListener(\"click\", {name})"),
        ];

        patterns.iter().any(|pattern| self.text.contains(pattern))
    }

    /// Whole-word occurrences of `name`, minus one for the declaration.
    /// The declaration always matches, so the result never underflows.
    fn reference_count(&self, name: &str) -> usize {
        if name.is_empty() {
            return 0;
        }
        let Ok(word_re) = Regex::new(&format!(r"\b{}\b", regex::escape(name))) else {
            return 0;
        };
        word_re.find_iter(&self.text).count().saturating_sub(1)
    }

    fn template_bindings(&self, name: &str) -> Vec<String> {
        let Some(section) = self.template_section.as_deref() else {
            return Vec::new();
        };
        self.mustache_re
            .captures_iter(section)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|expr| expr_references(expr, name))
            .collect()
    }
}

/// Text between the first `<template` opening tag and the first subsequent
/// `</template>` closing tag
fn extract_template_section(text: &str) -> Option<String> {
    let open = text.find("<template")?;
    let body_start = text[open..].find('>').map(|offset| open + offset + 1)?;
    let close = text[body_start..].find("</template>")?;
    Some(text[body_start..body_start + close].to_string())
}

/// Capture the bodies of `return ( ... )` blocks (non-greedy first paren pair)
fn extract_return_blocks(text: &str) -> Vec<String> {
    let re = Regex::new(r"(?s)return\s*\((.*?)\)").expect("static regex");
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A mustache expression references a name when the name appears as a whole
/// word inside it
fn expr_references(expr: &str, name: &str) -> bool {
    Regex::new(&format!(r"\b{}\b", regex::escape(name)))
        .map(|re| re.is_match(expr))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_count_subtracts_declaration() {
        // `x` appears 5 times including its declaration
        let text = "const x = 1;\nuse(x); log(x); add(x, x);";
        let analyzer = ContextAnalyzer::new(text, Framework::General);
        assert_eq!(analyzer.analyze("x").reference_count, 4);
    }

    #[test]
    fn reference_count_never_goes_negative() {
        let analyzer = ContextAnalyzer::new("", Framework::General);
        assert_eq!(analyzer.analyze("missing").reference_count, 0);
    }

    #[test]
    fn vue_template_usage_is_substring_based() {
        let text = "<template>\n  <div>{{ count }}</div>\n</template>\n<script setup>\nconst count = ref(0)\n</script>";
        let analyzer = ContextAnalyzer::new(text, Framework::Vue);
        let context = analyzer.analyze("count");
        assert!(context.used_in_template);
        assert_eq!(context.template_bindings, vec!["count".to_string()]);
        assert!(!analyzer.analyze("absent").used_in_template);
    }

    #[test]
    fn react_template_usage_searches_return_blocks() {
        let text = "function App() {\n  return (\n    <button>{label}</button>\n  )\n}";
        let analyzer = ContextAnalyzer::new(text, Framework::React);
        assert!(analyzer.analyze("label").used_in_template);
        assert!(!analyzer.analyze("unused").used_in_template);
    }

    #[test]
    fn event_usage_matches_fixed_patterns() {
        let vue = ContextAnalyzer::new("<button @click=\"onSave\">", Framework::Vue);
        assert!(vue.analyze("onSave").used_in_events);

        let react = ContextAnalyzer::new("<button onClick={handleSave} />", Framework::React);
        assert!(react.analyze("handleSave").used_in_events);

        let dom = ContextAnalyzer::new(
            "el.addEventListener('click', onSave)",
            Framework::General,
        );
        assert!(dom.analyze("onSave").used_in_events);
        assert!(!dom.analyze("other").used_in_events);
    }
}
