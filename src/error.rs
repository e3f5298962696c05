use thiserror::Error;

/// Errors surfaced across the fingerprinting engine.
///
/// Decode failures and degenerate-audio conditions are *not* represented
/// here: per the component contracts, those are absorbed locally (the
/// loader yields an empty signal, the hash generator yields no hashes).
/// This type carries only the errors that must propagate to the caller.
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("unsupported audio file extension: {0}")]
    UnsupportedExtension(String),

    #[error("index I/O failure: {0}")]
    Index(#[from] rusqlite::Error),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("mapping file error: {0}")]
    Mapping(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FingerprintError>;
