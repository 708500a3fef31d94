use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to enumerate {0}: {1}")]
    Walk(String, walkdir::Error),

    #[error("invalid manifest: {0}")]
    Manifest(String),

    #[error("versions fetch failed: {0}")]
    Versions(String),
}

pub type Result<T> = std::result::Result<T, Error>;
