use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SymscopeError};

/// A zero-based line/column position in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A source range spanning from `start` to `end` (inclusive lines)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    pub start: Position,
    pub end: Position,
}

impl SourceRange {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Number of lines the range covers, at least 1
    pub fn line_span(&self) -> usize {
        self.end.line.saturating_sub(self.start.line) + 1
    }
}

/// Raw symbol kind as reported by the outline provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineKind {
    Function,
    Method,
    Class,
    Interface,
    TypeAlias,
    Variable,
    Constant,
    Property,
    Enum,
    Module,
    Other,
}

/// A raw, already-parsed symbol entry supplied by an outline provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineNode {
    /// Symbol name
    pub name: String,

    /// Raw symbol kind (function, class, variable, ...)
    pub kind: OutlineKind,

    /// Range of the full declaration in the document
    pub range: SourceRange,

    /// Optional provider-supplied detail string
    pub detail: Option<String>,

    /// Child symbols, in source order
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn new(name: impl Into<String>, kind: OutlineKind, range: SourceRange) -> Self {
        Self {
            name: name.into(),
            kind,
            range,
            detail: None,
            children: Vec::new(),
        }
    }
}

/// An in-memory document: identity plus full text
#[derive(Debug, Clone)]
pub struct Document {
    /// Path identifying the document
    pub path: PathBuf,

    /// Full document text
    pub text: String,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Read a document from disk, enforcing the configured size limit
    pub fn from_path<P: AsRef<Path>>(path: P, max_file_size: usize) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        if text.len() > max_file_size {
            return Err(SymscopeError::Document(format!(
                "File {} exceeds maximum size limit",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    /// File name portion of the path, empty when absent
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("")
    }

    /// Document text as lines
    pub fn lines(&self) -> Vec<&str> {
        self.text.lines().collect()
    }
}

/// Trait implemented by outline sources.
///
/// A provider turns a document into a forest of raw outline nodes. An empty
/// forest means "no symbols" and is not an error.
#[async_trait]
pub trait OutlineProvider: Send + Sync {
    /// Extract the raw outline forest for a document
    async fn outline(&self, document: &Document) -> Result<Vec<OutlineNode>>;

    /// File extensions this provider handles
    fn file_extensions(&self) -> &[&str];

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}
