use thiserror::Error;

#[derive(Error, Debug)]
pub enum MocapError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Corrupt file: {0}")]
    Corrupt(String),

    #[error("Degenerate input: {0}")]
    Degenerate(String),

    #[error("Type mismatch: {group}:{name} is stored as {stored}, requested {requested}")]
    TypeMismatch {
        group: String,
        name: String,
        stored: &'static str,
        requested: &'static str,
    },

    #[error("Not found: {0}")]
    NotFound(String),
}

impl MocapError {
    /// Fatal errors abort an import; degenerate input has a defined fallback.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, MocapError::Degenerate(_) | MocapError::NotFound(_))
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, MocapError>;
