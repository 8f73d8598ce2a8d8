use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayerfigError {
    #[error("failed to open config file {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config file type not supported")]
    UnsupportedFileType,

    #[error("failed to decode {}: {message}", .path.display())]
    FileDecode { path: PathBuf, message: String },

    #[error("error parsing environment variable '{key}' with value '{value}' into {kind}")]
    EnvParse {
        key: String,
        value: String,
        kind: &'static str,
    },

    #[error(transparent)]
    EnvParseBool(#[from] std::str::ParseBoolError),

    #[error("{0}")]
    FlagParse(#[from] Box<clap::Error>),

    #[error("key '{key}' is registered more than once")]
    KeyCollision { key: String },
}
