//! svg2dxf 文件处理
//!
//! - `node`: 输入节点约定及基于 roxmltree 的实现
//! - `sink`: 输出端约定（`DrawingSink`）及记录用实现
//! - `dxf_io`: 基于 dxf crate 的输出端
//! - `emitter`: 遍历节点树并逐个输出图元
//! - `convert`: SVG 文件到 DXF 文件的完整流程

pub mod convert;
pub mod dxf_io;
pub mod emitter;
pub mod error;
pub mod node;
pub mod sink;

pub use convert::{convert_file, convert_node, convert_str};
pub use dxf_io::DxfSink;
pub use emitter::{ConversionSummary, ShapeEmitter};
pub use error::FileError;
pub use node::{parse_document, SourceNode};
pub use sink::{DrawingSink, Primitive, RecordingSink};
