use thiserror::Error;

pub type Result<T, E = ExportError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ExportError {
    /// A node was reached again while already on the path from its root.
    #[error("cyclic input: node `{node}` is its own ancestor")]
    CyclicInput { node: String },

    #[error("invalid input: {0}")]
    InvalidInput(#[from] serde_json::Error),

    #[error("failed to build PDF: {0}")]
    Pdf(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExportError {
    pub(crate) fn pdf(err: impl std::fmt::Display) -> Self {
        ExportError::Pdf(err.to_string())
    }
}
