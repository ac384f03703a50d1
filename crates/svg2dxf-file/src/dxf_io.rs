//! DXF 输出端
//!
//! 把图元写成模型空间实体：
//! - 圆 → CIRCLE
//! - 折线 → LWPOLYLINE（带闭合标志）
//! - 直线 → LINE
//! - 文字 → TEXT

use crate::error::FileError;
use crate::sink::DrawingSink;
use std::path::Path;
use svg2dxf_core::config::DxfVersion;
use svg2dxf_core::math::Point2;
use svg2dxf_core::style::ResolvedStyle;
use tracing::trace;

/// DXF 标准线宽（百分之一毫米）
const STANDARD_LINEWEIGHTS: [i16; 24] = [
    0, 5, 9, 13, 15, 18, 20, 25, 30, 35, 40, 50, 53, 60, 70, 80, 90, 100, 106, 120, 140, 158,
    200, 211,
];

/// 写入 `dxf::Drawing` 的输出端
pub struct DxfSink {
    drawing: dxf::Drawing,
    true_color: bool,
}

impl DxfSink {
    pub fn new(version: DxfVersion) -> Self {
        let mut drawing = dxf::Drawing::new();
        drawing.header.version = acad_version(version);
        Self {
            drawing,
            true_color: version.supports_true_color(),
        }
    }

    pub fn drawing(&self) -> &dxf::Drawing {
        &self.drawing
    }

    pub fn into_drawing(self) -> dxf::Drawing {
        self.drawing
    }

    /// 保存到文件
    pub fn save(&self, path: &Path) -> Result<(), FileError> {
        self.drawing
            .save_file(path)
            .map_err(|e| FileError::Dxf(e.to_string()))
    }

    fn push(&mut self, specific: dxf::entities::EntityType, style: &ResolvedStyle) {
        let mut entity = dxf::entities::Entity::new(specific);
        apply_style(&mut entity.common, style, self.true_color);
        self.drawing.add_entity(entity);
    }
}

impl DrawingSink for DxfSink {
    fn add_circle(
        &mut self,
        center: Point2,
        radius: f64,
        style: &ResolvedStyle,
    ) -> Result<(), FileError> {
        check_point("circle center", &center)?;
        check_finite("circle radius", radius)?;

        let mut circle = dxf::entities::Circle::default();
        circle.center = to_dxf_point(&center);
        circle.radius = radius;
        trace!(x = center.x, y = center.y, radius, "CIRCLE");
        self.push(dxf::entities::EntityType::Circle(circle), style);
        Ok(())
    }

    fn add_polyline(
        &mut self,
        points: &[Point2],
        closed: bool,
        style: &ResolvedStyle,
    ) -> Result<(), FileError> {
        for point in points {
            check_point("polyline vertex", point)?;
        }

        let mut lwpoly = dxf::entities::LwPolyline::default();
        lwpoly.set_is_closed(closed);
        lwpoly.vertices = points
            .iter()
            .map(|p| {
                let mut vertex = dxf::LwPolylineVertex::default();
                vertex.x = p.x;
                vertex.y = p.y;
                vertex
            })
            .collect();
        trace!(vertices = points.len(), closed, "LWPOLYLINE");
        self.push(dxf::entities::EntityType::LwPolyline(lwpoly), style);
        Ok(())
    }

    fn add_line(
        &mut self,
        start: Point2,
        end: Point2,
        style: &ResolvedStyle,
    ) -> Result<(), FileError> {
        check_point("line start", &start)?;
        check_point("line end", &end)?;

        let mut line = dxf::entities::Line::default();
        line.p1 = to_dxf_point(&start);
        line.p2 = to_dxf_point(&end);
        self.push(dxf::entities::EntityType::Line(line), style);
        Ok(())
    }

    fn add_text(
        &mut self,
        content: &str,
        position: Point2,
        height: f64,
        rotation: f64,
        style: &ResolvedStyle,
    ) -> Result<(), FileError> {
        check_point("text position", &position)?;
        check_finite("text rotation", rotation)?;
        if !height.is_finite() || height <= 0.0 {
            return Err(FileError::InvalidGeometry(format!(
                "text height must be positive, got {height}"
            )));
        }

        let mut text = dxf::entities::Text::default();
        text.location = to_dxf_point(&position);
        text.text_height = height;
        text.value = content.to_string();
        text.rotation = rotation;
        trace!(content, height, rotation, "TEXT");
        self.push(dxf::entities::EntityType::Text(text), style);
        Ok(())
    }
}

fn acad_version(version: DxfVersion) -> dxf::enums::AcadVersion {
    match version {
        DxfVersion::R2000 => dxf::enums::AcadVersion::R2000,
        DxfVersion::R2004 => dxf::enums::AcadVersion::R2004,
        DxfVersion::R2007 => dxf::enums::AcadVersion::R2007,
        DxfVersion::R2010 => dxf::enums::AcadVersion::R2010,
        DxfVersion::R2013 => dxf::enums::AcadVersion::R2013,
        DxfVersion::R2018 => dxf::enums::AcadVersion::R2018,
    }
}

fn to_dxf_point(point: &Point2) -> dxf::Point {
    dxf::Point::new(point.x, point.y, 0.0)
}

fn check_finite(what: &str, value: f64) -> Result<(), FileError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FileError::InvalidGeometry(format!("{what} is {value}")))
    }
}

fn check_point(what: &str, point: &Point2) -> Result<(), FileError> {
    check_finite(what, point.x)?;
    check_finite(what, point.y)
}

fn apply_style(common: &mut dxf::entities::EntityCommon, style: &ResolvedStyle, true_color: bool) {
    if let Some(color) = style.color {
        common.color = dxf::Color::from_index(color_to_aci(color));
        if true_color {
            common.color_24_bit = color as i32;
        }
    }
    if let Some(lineweight) = style.lineweight.and_then(snap_lineweight) {
        common.lineweight_enum_value = lineweight;
    }
}

/// 取最接近的标准线宽
///
/// 负值没有对应的线宽，返回 `None`；超过 211 的取 211。
pub fn snap_lineweight(value: i32) -> Option<i16> {
    if value < 0 {
        return None;
    }
    STANDARD_LINEWEIGHTS
        .iter()
        .copied()
        .min_by_key(|w| (i64::from(*w) - i64::from(value)).abs())
}

/// 基本色及其 ACI，黑色与白色共用 7
const BASIC_ACI_COLORS: [(u32, u8); 9] = [
    (0xff0000, 1),
    (0xffff00, 2),
    (0x00ff00, 3),
    (0x00ffff, 4),
    (0x0000ff, 5),
    (0xff00ff, 6),
    (0xffffff, 7),
    (0x000000, 7),
    (0x808080, 8),
];

/// 24 位颜色转 AutoCAD 颜色索引(ACI)
///
/// 取 RGB 距离最近的基本色。
fn color_to_aci(color: u32) -> u8 {
    let rgb = |c: u32| [(c >> 16) & 0xff, (c >> 8) & 0xff, c & 0xff].map(i64::from);
    let target = rgb(color);
    BASIC_ACI_COLORS
        .iter()
        .min_by_key(|(basic, _)| {
            rgb(*basic)
                .iter()
                .zip(&target)
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<i64>()
        })
        .map_or(7, |(_, aci)| *aci)
}
