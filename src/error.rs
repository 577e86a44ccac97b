use thiserror::Error;

/// Main error type for Symscope operations
#[derive(Error, Debug)]
pub enum SymscopeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Outline provider error: {0}")]
    Provider(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document error: {0}")]
    Document(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),
}

pub type Result<T> = std::result::Result<T, SymscopeError>;
