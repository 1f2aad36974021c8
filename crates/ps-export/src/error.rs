//! Error types for the export job client.

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("An export is already running")]
    AlreadyRunning,

    #[error("No export is running")]
    NotRunning,

    #[error("Invalid export request: {0}")]
    InvalidRequest(String),

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Failed to spawn poll worker: {0}")]
    Spawn(#[from] std::io::Error),
}

impl ExportError {
    pub fn backend(message: impl Into<String>) -> Self {
        ExportError::Backend {
            message: message.into(),
        }
    }
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
