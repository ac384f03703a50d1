//! 输出端约定
//!
//! 遍历器只通过 `DrawingSink` 写出图元，坐标都已是最终的目标坐标。

use crate::error::FileError;
use serde::Serialize;
use svg2dxf_core::math::Point2;
use svg2dxf_core::style::ResolvedStyle;

/// 接收图元的输出端
pub trait DrawingSink {
    fn add_circle(
        &mut self,
        center: Point2,
        radius: f64,
        style: &ResolvedStyle,
    ) -> Result<(), FileError>;

    /// `closed` 为真时首尾相连
    fn add_polyline(
        &mut self,
        points: &[Point2],
        closed: bool,
        style: &ResolvedStyle,
    ) -> Result<(), FileError>;

    fn add_line(&mut self, start: Point2, end: Point2, style: &ResolvedStyle)
        -> Result<(), FileError>;

    /// `rotation` 单位为度
    fn add_text(
        &mut self,
        content: &str,
        position: Point2,
        height: f64,
        rotation: f64,
        style: &ResolvedStyle,
    ) -> Result<(), FileError>;
}

/// 记录下来的一次输出调用
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Primitive {
    Circle {
        center: Point2,
        radius: f64,
        style: ResolvedStyle,
    },
    Polyline {
        points: Vec<Point2>,
        closed: bool,
        style: ResolvedStyle,
    },
    Line {
        start: Point2,
        end: Point2,
        style: ResolvedStyle,
    },
    Text {
        content: String,
        position: Point2,
        height: f64,
        rotation: f64,
        style: ResolvedStyle,
    },
}

impl Primitive {
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Circle { .. } => "circle",
            Primitive::Polyline { .. } => "polyline",
            Primitive::Line { .. } => "line",
            Primitive::Text { .. } => "text",
        }
    }

    pub fn style(&self) -> &ResolvedStyle {
        match self {
            Primitive::Circle { style, .. }
            | Primitive::Polyline { style, .. }
            | Primitive::Line { style, .. }
            | Primitive::Text { style, .. } => style,
        }
    }

    /// 把这次调用转发给另一个输出端
    pub fn replay<S: DrawingSink + ?Sized>(&self, sink: &mut S) -> Result<(), FileError> {
        match self {
            Primitive::Circle {
                center,
                radius,
                style,
            } => sink.add_circle(*center, *radius, style),
            Primitive::Polyline {
                points,
                closed,
                style,
            } => sink.add_polyline(points, *closed, style),
            Primitive::Line { start, end, style } => sink.add_line(*start, *end, style),
            Primitive::Text {
                content,
                position,
                height,
                rotation,
                style,
            } => sink.add_text(content, *position, *height, *rotation, style),
        }
    }
}

/// 只记录调用的输出端
///
/// 用于测试，也可先缓存一棵子树的输出，确认没有错误后再写入真正的输出端。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordingSink {
    pub primitives: Vec<Primitive>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// 按记录顺序转发全部调用
    pub fn replay<S: DrawingSink + ?Sized>(&self, sink: &mut S) -> Result<(), FileError> {
        for primitive in &self.primitives {
            primitive.replay(sink)?;
        }
        Ok(())
    }
}

impl DrawingSink for RecordingSink {
    fn add_circle(
        &mut self,
        center: Point2,
        radius: f64,
        style: &ResolvedStyle,
    ) -> Result<(), FileError> {
        self.primitives.push(Primitive::Circle {
            center,
            radius,
            style: *style,
        });
        Ok(())
    }

    fn add_polyline(
        &mut self,
        points: &[Point2],
        closed: bool,
        style: &ResolvedStyle,
    ) -> Result<(), FileError> {
        self.primitives.push(Primitive::Polyline {
            points: points.to_vec(),
            closed,
            style: *style,
        });
        Ok(())
    }

    fn add_line(
        &mut self,
        start: Point2,
        end: Point2,
        style: &ResolvedStyle,
    ) -> Result<(), FileError> {
        self.primitives.push(Primitive::Line {
            start,
            end,
            style: *style,
        });
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
        self.primitives.push(Primitive::Text {
            content: content.to_string(),
            position,
            height,
            rotation,
            style: *style,
        });
        Ok(())
    }
}
