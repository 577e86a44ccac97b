use serde::{Deserialize, Serialize};

/// Front-end framework flavor of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Framework {
    Vue,
    React,
    General,
}

impl Framework {
    pub fn display_name(&self) -> &'static str {
        match self {
            Framework::Vue => "Vue",
            Framework::React => "React",
            Framework::General => "General",
        }
    }
}

impl Default for Framework {
    fn default() -> Self {
        Framework::General
    }
}

/// Decides whether a document is Vue-flavored, React-flavored, or generic.
///
/// Evaluation order is a contract: extension evidence always outranks import
/// evidence, which outranks content keywords. The detector is total — it
/// never fails and always returns one of the three values.
pub struct FrameworkDetector;

impl FrameworkDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detect the framework for a file name plus full document text
    pub fn detect(&self, file_name: &str, text: &str) -> Framework {
        // Rule 1: file extension
        if let Some(framework) = self.detect_by_extension(file_name) {
            return framework;
        }

        // Rule 2: import statements
        if let Some(framework) = self.detect_by_imports(text) {
            return framework;
        }

        // Rule 3: content keywords
        if let Some(framework) = self.detect_by_content(text) {
            return framework;
        }

        Framework::General
    }

    fn detect_by_extension(&self, file_name: &str) -> Option<Framework> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".vue") {
            return Some(Framework::Vue);
        }
        if lower.ends_with(".jsx") || lower.ends_with(".tsx") {
            return Some(Framework::React);
        }
        None
    }

    fn detect_by_imports(&self, text: &str) -> Option<Framework> {
        for line in text.lines() {
            let trimmed = line.trim_start();
            if !trimmed.starts_with("import ") && !trimmed.starts_with("import{") {
                continue;
            }
            if trimmed.contains("vue") || trimmed.contains("@vue/") {
                return Some(Framework::Vue);
            }
            if trimmed.contains("react") || trimmed.contains("@react/") {
                return Some(Framework::React);
            }
        }
        None
    }

    fn detect_by_content(&self, text: &str) -> Option<Framework> {
        if text.contains("defineComponent") || text.contains("<script setup") {
            return Some(Framework::Vue);
        }
        if text.contains("useState") || text.contains("useEffect") || text.contains("React.") {
            return Some(Framework::React);
        }
        None
    }
}

impl Default for FrameworkDetector {
    fn default() -> Self {
        Self::new()
    }
}
