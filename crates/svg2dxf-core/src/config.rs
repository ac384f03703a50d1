//! 转换参数
//!
//! 进程级的数值常量，默认值：
//! - 1pt 对应 25 个 DXF 单位（10pt 的文字高度为 250）
//! - 路径采样间隔 10（SVG 坐标系中的长度，越小曲线分得越细）
//! - SVG 用户单位到 DXF 长度的缩放 1.0

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 输出的 DXF 版本
///
/// 最低为 R2000，更早的版本没有 LWPOLYLINE 实体。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DxfVersion {
    R2000,
    R2004,
    R2007,
    R2010,
    #[default]
    R2013,
    R2018,
}

impl DxfVersion {
    /// 是否支持真彩色（组码 420）
    pub fn supports_true_color(&self) -> bool {
        !matches!(self, DxfVersion::R2000)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// 每磅对应的 DXF 长度
    pub pt_to_dxf: f64,
    /// 路径采样间隔（SVG 单位）
    pub path_sampling_interval: f64,
    /// SVG 用户单位到 DXF 长度的缩放
    pub svg_unit_to_dxf: f64,
    /// 曲线求弧长的误差
    pub length_tolerance: f64,
    /// 未指定字号时使用的值
    pub default_font_size: String,
    pub dxf_version: DxfVersion,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            pt_to_dxf: 25.0,
            path_sampling_interval: 10.0,
            svg_unit_to_dxf: 1.0,
            length_tolerance: 1e-4,
            default_font_size: "10pt".to_string(),
            dxf_version: DxfVersion::R2013,
        }
    }
}

impl ConversionConfig {
    /// 从 JSON 文本加载，缺失字段取默认值
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// 检查数值参数
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, value) in [
            ("pt_to_dxf", self.pt_to_dxf),
            ("path_sampling_interval", self.path_sampling_interval),
            ("svg_unit_to_dxf", self.svg_unit_to_dxf),
            ("length_tolerance", self.length_tolerance),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        Ok(())
    }
}
