//! 样式解析
//!
//! 从 `style="k:v;k:v"` 和同名的普通属性中取出描边颜色、线宽和字号，
//! 并换算成 DXF 使用的数值。
//!
//! 样式不从祖先节点继承，每个节点独立解析。

use crate::error::CoreError;
use crate::math::parse_number;
use crate::policy::{recover_lenient, ParseSite};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub const STROKE: &str = "stroke";
pub const STROKE_WIDTH: &str = "stroke-width";
pub const FONT_SIZE: &str = "font-size";

/// 字号无法识别时使用的磅值
pub const FALLBACK_FONT_POINTS: f64 = 10.0;

static FONT_POINTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d\.]+)pt").expect("font size pattern is valid"));

/// RGB颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// 转换为 DXF 真彩色（0x00RRGGBB）
    pub const fn to_true_color(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// 解析 `#RRGGBB` 或 `#RGB`，前导 `#` 可省略
    pub fn parse_hex(text: &str) -> Result<Self, CoreError> {
        let digits = text.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        let expanded: String = match digits.chars().count() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(CoreError::InvalidColor(text.to_string())),
        };
        match hex::decode(&expanded) {
            Ok(bytes) if bytes.len() == 3 => Ok(Self::new(bytes[0], bytes[1], bytes[2])),
            _ => Err(CoreError::InvalidColor(text.to_string())),
        }
    }

    pub const BLACK: Color = Color::new(0, 0, 0);
}

/// 解析 `style` 字符串
///
/// 以 `;` 分隔，每项按第一个 `:` 拆成键值并去除首尾空白；没有冒号的项被跳过。
pub fn parse_style(text: &str) -> BTreeMap<String, String> {
    text.split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter_map(|item| match item.split_once(':') {
            Some((key, value)) => Some((key.trim().to_string(), value.trim().to_string())),
            None => {
                tracing::debug!(site = ?ParseSite::StyleEntry, item, "style entry without ':' skipped");
                None
            }
        })
        .collect()
}

/// 节点的样式属性
///
/// `style` 中的值优先；值为空或缺失时回退到同名普通属性。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleAttributes {
    style: BTreeMap<String, String>,
    plain: BTreeMap<String, String>,
}

impl StyleAttributes {
    /// 由 `style` 属性和节点的全部普通属性构造
    pub fn from_parts<'a>(
        style: Option<&str>,
        plain: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self {
            style: style.map(parse_style).unwrap_or_default(),
            plain: plain
                .into_iter()
                .filter(|(name, _)| *name != "style")
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    /// 查找属性值
    pub fn get(&self, key: &str) -> Option<&str> {
        self.style
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .or_else(|| self.plain.get(key).map(String::as_str))
            .filter(|v| !v.is_empty())
    }

    /// 描边颜色（24 位整数）
    ///
    /// 没有 `stroke` 或值为 `none` 时返回 `None`；无法识别的格式回退为黑色。
    pub fn resolve_color(&self) -> Option<u32> {
        let stroke = self.get(STROKE).filter(|v| *v != "none")?;
        let color = recover_lenient(ParseSite::StrokeColor, Color::parse_hex(stroke), || {
            Color::BLACK
        });
        Some(color.to_true_color())
    }

    /// 线宽（目标单位的百分之一，截断为整数）
    pub fn resolve_lineweight(&self, unit_scale: f64) -> Option<i32> {
        let width = self.get(STROKE_WIDTH).filter(|v| *v != "none")?;
        recover_lenient(
            ParseSite::StrokeWidth,
            lineweight_from_width(width, unit_scale).map(Some),
            || None,
        )
    }

    /// 字号（磅）
    ///
    /// 按 `style`、普通属性、`default` 的顺序取值，提取 `pt` 前的数字；
    /// 无法识别时为 10。
    pub fn resolve_font_size(&self, default: &str) -> f64 {
        let value = self.get(FONT_SIZE).unwrap_or(default);
        recover_lenient(ParseSite::FontSize, font_points(value), || {
            FALLBACK_FONT_POINTS
        })
    }

    /// 计算传给输出端的属性
    pub fn resolve(&self, unit_scale: f64) -> ResolvedStyle {
        ResolvedStyle {
            color: self.resolve_color(),
            lineweight: self.resolve_lineweight(unit_scale),
        }
    }
}

/// 换算后的实体属性
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStyle {
    /// 24 位真彩色
    pub color: Option<u32>,
    /// 线宽（百分之一单位）
    pub lineweight: Option<i32>,
}

fn lineweight_from_width(width: &str, unit_scale: f64) -> Result<i32, CoreError> {
    let value = (parse_number(width)? * unit_scale * 100.0).trunc();
    if !value.is_finite() || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(CoreError::InvalidNumber(width.to_string()));
    }
    Ok(value as i32)
}

fn font_points(value: &str) -> Result<f64, CoreError> {
    let caps = FONT_POINTS
        .captures(value)
        .ok_or_else(|| CoreError::InvalidFontSize(value.to_string()))?;
    parse_number(&caps[1]).map_err(|_| CoreError::InvalidFontSize(value.to_string()))
}
