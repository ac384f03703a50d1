//! 图形遍历与输出
//!
//! 深度优先遍历节点树，当前的组合矩阵作为参数逐层传入。`svg` 与 `g` 只组合
//! 自身的变换并继续遍历子节点；其余支持的标签各自换算几何，连同解析后的样式
//! 交给输出端。不认识的标签连同其子树一起跳过。

use crate::error::FileError;
use crate::node::SourceNode;
use crate::sink::DrawingSink;
use serde::Serialize;
use std::collections::BTreeMap;
use svg2dxf_core::config::ConversionConfig;
use svg2dxf_core::error::CoreError;
use svg2dxf_core::flatten::flatten_segments;
use svg2dxf_core::math::{parse_number, BoundingBox2, Point2};
use svg2dxf_core::path_data::{parse_path_data, parse_point_list};
use svg2dxf_core::policy::{propagate, ParseSite};
use svg2dxf_core::style::{ResolvedStyle, StyleAttributes};
use svg2dxf_core::transform::{compose, transform_point, AffineMatrix};
use tracing::debug;

/// 节点种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Container,
    Circle,
    Rect,
    Line,
    Polyline,
    Polygon,
    Path,
    Text,
    Unsupported,
}

impl ElementKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "svg" | "g" => ElementKind::Container,
            "circle" => ElementKind::Circle,
            "rect" => ElementKind::Rect,
            "line" => ElementKind::Line,
            "polyline" => ElementKind::Polyline,
            "polygon" => ElementKind::Polygon,
            "path" => ElementKind::Path,
            "text" => ElementKind::Text,
            _ => ElementKind::Unsupported,
        }
    }
}

/// 一次转换的统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionSummary {
    pub circles: usize,
    pub polylines: usize,
    pub lines: usize,
    pub texts: usize,
    /// 被跳过的标签及次数
    pub skipped: BTreeMap<String, usize>,
    /// 输出坐标的范围
    pub extents: BoundingBox2,
}

impl ConversionSummary {
    pub fn total(&self) -> usize {
        self.circles + self.polylines + self.lines + self.texts
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// 遍历节点树并向输出端写图元
pub struct ShapeEmitter<'a, S: DrawingSink + ?Sized> {
    sink: &'a mut S,
    config: &'a ConversionConfig,
    summary: ConversionSummary,
}

impl<'a, S: DrawingSink + ?Sized> ShapeEmitter<'a, S> {
    pub fn new(sink: &'a mut S, config: &'a ConversionConfig) -> Self {
        Self {
            sink,
            config,
            summary: ConversionSummary::default(),
        }
    }

    pub fn finish(self) -> ConversionSummary {
        self.summary
    }

    /// 处理一个节点及其子树
    ///
    /// `inherited` 为祖先节点组合后的矩阵，没有任何变换时为 `None`。
    pub fn walk<N: SourceNode>(
        &mut self,
        node: &N,
        inherited: Option<AffineMatrix>,
    ) -> Result<(), FileError> {
        let tag = node.local_name();
        let kind = ElementKind::from_tag(tag);

        if kind == ElementKind::Unsupported {
            debug!(
                tag,
                recovery = ?ParseSite::UnknownElement.recovery(),
                "skipping unsupported element"
            );
            *self.summary.skipped.entry(tag.to_string()).or_insert(0) += 1;
            return Ok(());
        }

        let matrix = compose(inherited, node.attr("transform"));

        if kind == ElementKind::Container {
            for child in node.child_elements() {
                self.walk(&child, matrix)?;
            }
            return Ok(());
        }

        let attrs = StyleAttributes::from_parts(node.attr("style"), node.attrs());
        let style = attrs.resolve(self.config.svg_unit_to_dxf);
        let m = matrix.as_ref();

        match kind {
            ElementKind::Circle => self.emit_circle(node, m, &style),
            ElementKind::Rect => self.emit_rect(node, m, &style),
            ElementKind::Line => self.emit_line(node, m, &style),
            ElementKind::Polyline => self.emit_points(node, m, false, &style),
            ElementKind::Polygon => self.emit_points(node, m, true, &style),
            ElementKind::Path => self.emit_path(node, m, &style),
            ElementKind::Text => self.emit_text(node, m, &attrs, &style),
            ElementKind::Container | ElementKind::Unsupported => Ok(()),
        }
    }

    fn emit_circle<N: SourceNode>(
        &mut self,
        node: &N,
        matrix: Option<&AffineMatrix>,
        style: &ResolvedStyle,
    ) -> Result<(), FileError> {
        let [cx, cy, r] = number_attrs(node, ["cx", "cy", "r"])?;
        let unit = self.config.svg_unit_to_dxf;

        let center = self.to_target(matrix, Point2::new(cx, cy));
        let scale = matrix.map_or(1.0, |m| m.decompose().average_scale());
        let radius = r * scale * unit;

        debug!(x = center.x, y = center.y, radius, "circle");
        self.sink.add_circle(center, radius, style)?;
        self.summary.circles += 1;
        self.include(&Point2::new(center.x - radius, center.y - radius));
        self.include(&Point2::new(center.x + radius, center.y + radius));
        Ok(())
    }

    fn emit_rect<N: SourceNode>(
        &mut self,
        node: &N,
        matrix: Option<&AffineMatrix>,
        style: &ResolvedStyle,
    ) -> Result<(), FileError> {
        let [x, y, w, h] = number_attrs(node, ["x", "y", "width", "height"])?;
        let points: Vec<Point2> = [(x, y), (x + w, y), (x + w, y + h), (x, y + h), (x, y)]
            .into_iter()
            .map(|(px, py)| self.to_target(matrix, Point2::new(px, py)))
            .collect();

        debug!(x, y, width = w, height = h, "rect");
        self.add_polyline(&points, true, style)
    }

    fn emit_line<N: SourceNode>(
        &mut self,
        node: &N,
        matrix: Option<&AffineMatrix>,
        style: &ResolvedStyle,
    ) -> Result<(), FileError> {
        let [x1, y1, x2, y2] = number_attrs(node, ["x1", "y1", "x2", "y2"])?;
        let start = self.to_target(matrix, Point2::new(x1, y1));
        let end = self.to_target(matrix, Point2::new(x2, y2));

        debug!(x1 = start.x, y1 = start.y, x2 = end.x, y2 = end.y, "line");
        self.sink.add_line(start, end, style)?;
        self.summary.lines += 1;
        self.include(&start);
        self.include(&end);
        Ok(())
    }

    fn emit_points<N: SourceNode>(
        &mut self,
        node: &N,
        matrix: Option<&AffineMatrix>,
        closed: bool,
        style: &ResolvedStyle,
    ) -> Result<(), FileError> {
        let text = node.attr("points").unwrap_or("").trim();
        if text.is_empty() {
            return Ok(());
        }

        let parsed = propagate(ParseSite::PointList, parse_point_list(text))
            .map_err(|source| node_error(node, source))?;
        let points: Vec<Point2> = parsed
            .into_iter()
            .map(|p| self.to_target(matrix, p))
            .collect();

        debug!(vertices = points.len(), closed, "polyline");
        self.add_polyline(&points, closed, style)
    }

    fn emit_path<N: SourceNode>(
        &mut self,
        node: &N,
        matrix: Option<&AffineMatrix>,
        style: &ResolvedStyle,
    ) -> Result<(), FileError> {
        let data = node.attr("d").unwrap_or("");
        let segments = propagate(ParseSite::PathData, parse_path_data(data))
            .map_err(|source| node_error(node, source))?;

        let points = flatten_segments(
            &segments,
            matrix,
            self.config.path_sampling_interval,
            self.config.length_tolerance,
            self.config.svg_unit_to_dxf,
        )
        .map_err(|source| node_error(node, source))?;
        if points.is_empty() {
            debug!("path without segments");
            return Ok(());
        }

        debug!(segments = segments.len(), vertices = points.len(), "path");
        self.add_polyline(&points, false, style)
    }

    fn emit_text<N: SourceNode>(
        &mut self,
        node: &N,
        matrix: Option<&AffineMatrix>,
        attrs: &StyleAttributes,
        style: &ResolvedStyle,
    ) -> Result<(), FileError> {
        let [x, y] = number_attrs(node, ["x", "y"])?;
        let content = node.text_content();
        let content = content.trim();

        let font_points = attrs.resolve_font_size(&self.config.default_font_size);
        let (rotation, scale) = match matrix {
            Some(m) => {
                let rs = m.decompose();
                (rs.rotation_degrees, rs.average_scale())
            }
            None => (0.0, 1.0),
        };
        let height = font_points * self.config.pt_to_dxf * scale;
        let position = self.to_target(matrix, Point2::new(x, y));

        debug!(content, height, rotation, "text");
        self.sink
            .add_text(content, position, height, rotation, style)?;
        self.summary.texts += 1;
        self.include(&position);
        Ok(())
    }

    fn add_polyline(
        &mut self,
        points: &[Point2],
        closed: bool,
        style: &ResolvedStyle,
    ) -> Result<(), FileError> {
        self.sink.add_polyline(points, closed, style)?;
        self.summary.polylines += 1;
        for p in points {
            self.include(p);
        }
        Ok(())
    }

    /// 局部坐标 → 全局坐标 → 目标单位
    fn to_target(&self, matrix: Option<&AffineMatrix>, point: Point2) -> Point2 {
        let p = transform_point(matrix, point);
        let unit = self.config.svg_unit_to_dxf;
        Point2::new(p.x * unit, p.y * unit)
    }

    fn include(&mut self, point: &Point2) {
        self.summary.extents.expand_to_include(point);
    }
}

/// 读取一组数值属性，缺失的取 0
fn number_attrs<N: SourceNode, const K: usize>(
    node: &N,
    names: [&str; K],
) -> Result<[f64; K], FileError> {
    let mut values = [0.0; K];
    for (value, name) in values.iter_mut().zip(names) {
        if let Some(text) = node.attr(name) {
            *value = propagate(ParseSite::GeometryAttribute, parse_number(text))
                .map_err(|source| node_error(node, source))?;
        }
    }
    Ok(values)
}

fn node_error<N: SourceNode>(node: &N, source: CoreError) -> FileError {
    FileError::Node {
        tag: node.local_name().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::parse_document;
    use crate::sink::{Primitive, RecordingSink};
    use svg2dxf_core::math::{approx_eq, points_approx_eq};

    fn run(svg: &str) -> (RecordingSink, ConversionSummary) {
        let config = ConversionConfig::default();
        let doc = parse_document(svg).unwrap();
        let mut sink = RecordingSink::new();
        let mut emitter = ShapeEmitter::new(&mut sink, &config);
        emitter.walk(&doc.root_element(), None).unwrap();
        let summary = emitter.finish();
        (sink, summary)
    }

    #[test]
    fn test_element_kind() {
        assert_eq!(ElementKind::from_tag("g"), ElementKind::Container);
        assert_eq!(ElementKind::from_tag("svg"), ElementKind::Container);
        assert_eq!(ElementKind::from_tag("polygon"), ElementKind::Polygon);
        assert_eq!(ElementKind::from_tag("ellipse"), ElementKind::Unsupported);
    }

    #[test]
    fn test_rect_ring() {
        let (sink, summary) =
            run(r#"<svg><rect x="1" y="2" width="3" height="4" stroke="red"/></svg>"#);
        assert_eq!(summary.polylines, 1);
        match &sink.primitives[0] {
            Primitive::Polyline {
                points,
                closed,
                style,
            } => {
                assert!(*closed);
                assert_eq!(points.len(), 5);
                assert!(points_approx_eq(&points[2], &Point2::new(4.0, 6.0)));
                assert!(points_approx_eq(&points[0], &points[4]));
                // 无法识别的颜色回退为黑色
                assert_eq!(style.color, Some(0));
            }
            other => panic!("unexpected primitive {other:?}"),
        }
    }

    #[test]
    fn test_nested_transforms() {
        let (sink, _) = run(
            r#"<svg><g transform="translate(10,0)"><g transform="scale(2)">
                <line x1="0" y1="0" x2="1" y2="1"/>
            </g></g></svg>"#,
        );
        match &sink.primitives[0] {
            Primitive::Line { start, end, .. } => {
                assert!(points_approx_eq(start, &Point2::new(10.0, 0.0)));
                assert!(points_approx_eq(end, &Point2::new(12.0, 2.0)));
            }
            other => panic!("unexpected primitive {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_subtree_skipped() {
        let (sink, summary) = run(
            r#"<svg><defs><circle r="1"/></defs><ellipse rx="1"/><circle r="2"/></svg>"#,
        );
        assert_eq!(sink.len(), 1);
        assert_eq!(summary.circles, 1);
        assert_eq!(summary.skipped.get("defs"), Some(&1));
        assert_eq!(summary.skipped.get("ellipse"), Some(&1));
        assert_eq!(summary.skipped_count(), 2);
    }

    #[test]
    fn test_circle_radius_scaled() {
        let (sink, summary) = run(r#"<svg><circle cx="1" cy="1" r="2" transform="scale(3)"/></svg>"#);
        match &sink.primitives[0] {
            Primitive::Circle { center, radius, .. } => {
                assert!(points_approx_eq(center, &Point2::new(3.0, 3.0)));
                assert!(approx_eq(*radius, 6.0));
            }
            other => panic!("unexpected primitive {other:?}"),
        }
        assert!(approx_eq(summary.extents.min.x, -3.0));
        assert!(approx_eq(summary.extents.max.x, 9.0));
    }

    #[test]
    fn test_text_rotated() {
        let (sink, _) = run(
            r#"<svg><text x="1" y="0" transform="rotate(90)" font-size="8pt">  Hi <tspan>there</tspan> </text></svg>"#,
        );
        match &sink.primitives[0] {
            Primitive::Text {
                content,
                position,
                height,
                rotation,
                ..
            } => {
                assert_eq!(content, "Hi there");
                assert!(points_approx_eq(position, &Point2::new(0.0, 1.0)));
                assert!(approx_eq(*height, 200.0));
                assert!(approx_eq(*rotation, 90.0));
            }
            other => panic!("unexpected primitive {other:?}"),
        }
    }

    #[test]
    fn test_empty_points_and_path() {
        let (sink, summary) =
            run(r#"<svg><polyline points="  "/><polygon/><path d=""/><path/></svg>"#);
        assert!(sink.is_empty());
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn test_missing_geometry_defaults_to_zero() {
        let (sink, _) = run(r#"<svg><line x2="5"/></svg>"#);
        match &sink.primitives[0] {
            Primitive::Line { start, end, .. } => {
                assert!(points_approx_eq(start, &Point2::origin()));
                assert!(points_approx_eq(end, &Point2::new(5.0, 0.0)));
            }
            other => panic!("unexpected primitive {other:?}"),
        }
    }

    #[test]
    fn test_malformed_geometry_is_error() {
        let config = ConversionConfig::default();
        let doc = parse_document(r#"<svg><circle r="big"/></svg>"#).unwrap();
        let mut sink = RecordingSink::new();
        let mut emitter = ShapeEmitter::new(&mut sink, &config);
        let err = emitter.walk(&doc.root_element(), None).unwrap_err();
        assert!(matches!(
            err,
            FileError::Node { ref tag, source: CoreError::InvalidNumber(_) } if tag == "circle"
        ));
    }

    #[test]
    fn test_huge_path_is_error() {
        let config = ConversionConfig::default();
        let doc = parse_document(r#"<svg><path d="M0 0 L1e100 0"/></svg>"#).unwrap();
        let mut sink = RecordingSink::new();
        let mut emitter = ShapeEmitter::new(&mut sink, &config);
        let err = emitter.walk(&doc.root_element(), None).unwrap_err();
        assert!(matches!(
            err,
            FileError::Node { ref tag, source: CoreError::TooManySamples { .. } } if tag == "path"
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_empty_transform_matches_zero_translation() {
        let shapes = r#"<circle cx="3" cy="4" r="2" transform="{t}"/>
            <rect x="1" y="1" width="2" height="3" transform="{t}"/>
            <path d="M0,0 Q10,10 20,0" transform="{t}"/>
            <text x="5" y="6" font-size="9pt" transform="{t}">a</text>"#;
        let (plain, _) = run(&format!("<svg>{}</svg>", shapes.replace("{t}", "")));
        let (zero, _) = run(&format!(
            "<svg>{}</svg>",
            shapes.replace("{t}", "translate(0,0)")
        ));
        assert_eq!(plain.len(), 4);
        assert_eq!(plain, zero);
    }
}
