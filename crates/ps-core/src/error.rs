use thiserror::Error;

#[derive(Error, Debug)]
pub enum PsError {
    #[error("Series length mismatch: {labels} labels, {values} values")]
    SeriesMismatch { labels: usize, values: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type PsResult<T> = Result<T, PsError>;
