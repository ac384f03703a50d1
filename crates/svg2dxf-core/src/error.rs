//! 核心层错误定义

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("Invalid point pair: {0:?}")]
    InvalidPointPair(String),

    #[error("Invalid path data at byte {offset}: {message}")]
    InvalidPathData { offset: usize, message: String },

    #[error("Path segment of length {length} needs more than {limit} samples")]
    TooManySamples { length: f64, limit: usize },

    #[error("Invalid transform: {0}")]
    InvalidTransform(String),

    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    #[error("Invalid font size: {0:?}")]
    InvalidFontSize(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
