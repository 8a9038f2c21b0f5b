use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChromeclothError {
    #[error("failed to read parameters from {path}: {source}")]
    ReadParams {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid parameter document: {0}")]
    InvalidParams(#[from] serde_json::Error),

    #[error("unknown preset `{0}` (expected `cloth` or `chromecloth`)")]
    UnknownPreset(String),

    #[error("failed to write {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preview encoding failed: {0}")]
    Preview(#[from] image::ImageError),
}

pub type ChromeclothResult<T> = Result<T, ChromeclothError>;
