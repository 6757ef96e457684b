use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid scan root: {0}")]
    InvalidRoot(String),

    #[error("Invalid path pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Engine error: {0}")]
    Engine(#[from] sift_engine::EngineError),

    #[error("{0}")]
    Other(String),
}
