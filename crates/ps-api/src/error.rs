use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Bad payload: {0}")]
    Payload(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ps_core::PsError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<ApiError> for ps_export::ExportError {
    fn from(err: ApiError) -> Self {
        ps_export::ExportError::backend(err.to_string())
    }
}
