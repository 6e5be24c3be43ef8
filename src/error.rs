use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Invalid chunk size: {0}")]
    InvalidChunkSize(u64),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remote source error: {0}")]
    Source(String),
}
