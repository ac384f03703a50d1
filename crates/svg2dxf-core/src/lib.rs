//! svg2dxf 几何核心
//!
//! 把 SVG 文档中的几何信息换算到 DXF 坐标空间所需的纯计算部分，不做任何 I/O。
//!
//! # 组成
//!
//! - `transform`: 2D 仿射变换的解析、组合、作用于点，以及旋转/缩放的近似分解
//! - `style`: `style` 属性解析，颜色/线宽/字号到 DXF 数值的换算
//! - `segment` / `path_data`: 路径段（直线、贝塞尔、椭圆弧）及 `d` 属性解析
//! - `flatten`: 按固定弧长间隔把路径段采样成折线
//! - `policy`: 各解析位置遇到非法输入时的统一处理策略
//!
//! # 示例
//!
//! ```rust
//! use svg2dxf_core::prelude::*;
//!
//! let m = AffineMatrix::parse_transform_list("translate(10,0) rotate(90)");
//! let p = m.apply(&Point2::new(1.0, 0.0));
//! assert!((p.x - 10.0).abs() < 1e-9);
//! assert!((p.y - 1.0).abs() < 1e-9);
//! ```

pub mod config;
pub mod error;
pub mod flatten;
pub mod math;
pub mod path_data;
pub mod policy;
pub mod segment;
pub mod style;
pub mod transform;

pub use error::CoreError;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::config::{ConversionConfig, DxfVersion};
    pub use crate::error::CoreError;
    pub use crate::flatten::{flatten_segments, sample_count};
    pub use crate::math::{BoundingBox2, Point2};
    pub use crate::path_data::{parse_path_data, parse_point_list};
    pub use crate::segment::{PathSegment, Segment};
    pub use crate::style::{ResolvedStyle, StyleAttributes};
    pub use crate::transform::{compose, AffineMatrix, RotationScale};
}
