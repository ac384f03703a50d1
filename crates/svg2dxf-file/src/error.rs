//! 文件操作错误定义

use svg2dxf_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("DXF error: {0}")]
    Dxf(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Failed to convert <{tag}>: {source}")]
    Node {
        tag: String,
        #[source]
        source: CoreError,
    },
}
