//! 路径段
//!
//! 每种路径段都提供弧长和参数化求点 `point(t)`，`t ∈ [0, 1]`：
//! - 直线 (LineSegment)
//! - 二次贝塞尔 (QuadraticBezier)
//! - 三次贝塞尔 (CubicBezier)
//! - 椭圆弧 (EllipticalArc)

use crate::math::{Point2, Vector2, EPSILON};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 细分求弧长的最小递归深度
const MIN_LENGTH_DEPTH: u32 = 5;

/// 细分求弧长的最大递归深度
const MAX_LENGTH_DEPTH: u32 = 16;

/// 参数化曲线段
pub trait Segment {
    /// 参数 `t ∈ [0, 1]` 处的点
    fn point(&self, t: f64) -> Point2;

    /// 弧长，`tolerance` 为允许的误差
    fn length(&self, tolerance: f64) -> f64;

    fn start_point(&self) -> Point2 {
        self.point(0.0)
    }

    fn end_point(&self) -> Point2 {
        self.point(1.0)
    }
}

/// 路径段类型枚举
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathSegment {
    Line(LineSegment),
    Quadratic(QuadraticBezier),
    Cubic(CubicBezier),
    Arc(EllipticalArc),
}

impl PathSegment {
    /// 获取路径段的类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            PathSegment::Line(_) => "Line",
            PathSegment::Quadratic(_) => "Quadratic",
            PathSegment::Cubic(_) => "Cubic",
            PathSegment::Arc(_) => "Arc",
        }
    }
}

impl Segment for PathSegment {
    fn point(&self, t: f64) -> Point2 {
        match self {
            PathSegment::Line(s) => s.point(t),
            PathSegment::Quadratic(s) => s.point(t),
            PathSegment::Cubic(s) => s.point(t),
            PathSegment::Arc(s) => s.point(t),
        }
    }

    fn length(&self, tolerance: f64) -> f64 {
        match self {
            PathSegment::Line(s) => s.length(tolerance),
            PathSegment::Quadratic(s) => s.length(tolerance),
            PathSegment::Cubic(s) => s.length(tolerance),
            PathSegment::Arc(s) => s.length(tolerance),
        }
    }
}

/// 线段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Point2,
    pub end: Point2,
}

impl LineSegment {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }
}

impl Segment for LineSegment {
    fn point(&self, t: f64) -> Point2 {
        self.start + (self.end - self.start) * t
    }

    fn length(&self, _tolerance: f64) -> f64 {
        (self.end - self.start).norm()
    }
}

/// 二次贝塞尔曲线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadraticBezier {
    pub start: Point2,
    pub control: Point2,
    pub end: Point2,
}

impl QuadraticBezier {
    pub fn new(start: Point2, control: Point2, end: Point2) -> Self {
        Self {
            start,
            control,
            end,
        }
    }
}

impl Segment for QuadraticBezier {
    fn point(&self, t: f64) -> Point2 {
        let u = 1.0 - t;
        let (w0, w1, w2) = (u * u, 2.0 * u * t, t * t);
        Point2::new(
            w0 * self.start.x + w1 * self.control.x + w2 * self.end.x,
            w0 * self.start.y + w1 * self.control.y + w2 * self.end.y,
        )
    }

    fn length(&self, tolerance: f64) -> f64 {
        subdivided_length(self, tolerance)
    }
}

/// 三次贝塞尔曲线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub start: Point2,
    pub control1: Point2,
    pub control2: Point2,
    pub end: Point2,
}

impl CubicBezier {
    pub fn new(start: Point2, control1: Point2, control2: Point2, end: Point2) -> Self {
        Self {
            start,
            control1,
            control2,
            end,
        }
    }
}

impl Segment for CubicBezier {
    fn point(&self, t: f64) -> Point2 {
        let u = 1.0 - t;
        let (w0, w1, w2, w3) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        Point2::new(
            w0 * self.start.x + w1 * self.control1.x + w2 * self.control2.x + w3 * self.end.x,
            w0 * self.start.y + w1 * self.control1.y + w2 * self.control2.y + w3 * self.end.y,
        )
    }

    fn length(&self, tolerance: f64) -> f64 {
        subdivided_length(self, tolerance)
    }
}

/// 椭圆弧（中心参数化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EllipticalArc {
    pub center: Point2,
    /// 旋转前 x 轴方向半径
    pub rx: f64,
    /// 旋转前 y 轴方向半径
    pub ry: f64,
    /// 椭圆 x 轴的旋转角（弧度）
    pub phi: f64,
    /// 起始参数角（弧度）
    pub theta: f64,
    /// 扫过的参数角（弧度，负值为顺时针）
    pub delta: f64,
}

impl EllipticalArc {
    /// 由 SVG 弧命令的端点参数构造
    ///
    /// 按 SVG 实现说明把端点参数化转换为中心参数化，半径不足时等比放大。
    /// 任一半径为 0 时退化为直线；起点与终点重合时返回 `None`（弧被省略）。
    pub fn from_endpoints(
        start: Point2,
        radii: (f64, f64),
        x_axis_rotation_degrees: f64,
        large_arc: bool,
        sweep: bool,
        end: Point2,
    ) -> Option<PathSegment> {
        if (end - start).norm() < EPSILON {
            return None;
        }
        let (rx, ry) = (radii.0.abs(), radii.1.abs());
        if rx < EPSILON || ry < EPSILON {
            return Some(PathSegment::Line(LineSegment::new(start, end)));
        }

        let phi = x_axis_rotation_degrees.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();

        // 中点差旋转到椭圆坐标系
        let half = (start - end) * 0.5;
        let x1 = cos_phi * half.x + sin_phi * half.y;
        let y1 = -sin_phi * half.x + cos_phi * half.y;

        // 半径修正
        let lambda = (x1 / rx).powi(2) + (y1 / ry).powi(2);
        let (rx, ry) = if lambda > 1.0 {
            let s = lambda.sqrt();
            (rx * s, ry * s)
        } else {
            (rx, ry)
        };

        let numerator = (rx * ry).powi(2) - (rx * y1).powi(2) - (ry * x1).powi(2);
        let denominator = (rx * y1).powi(2) + (ry * x1).powi(2);
        let mut coef = (numerator / denominator).max(0.0).sqrt();
        if large_arc == sweep {
            coef = -coef;
        }
        let cx1 = coef * rx * y1 / ry;
        let cy1 = -coef * ry * x1 / rx;

        let mid = Point2::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
        let center = Point2::new(
            cos_phi * cx1 - sin_phi * cy1 + mid.x,
            sin_phi * cx1 + cos_phi * cy1 + mid.y,
        );

        let u = Vector2::new((x1 - cx1) / rx, (y1 - cy1) / ry);
        let v = Vector2::new((-x1 - cx1) / rx, (-y1 - cy1) / ry);
        let theta = angle_between(&Vector2::new(1.0, 0.0), &u);
        let mut delta = angle_between(&u, &v).rem_euclid(2.0 * PI);
        if !sweep && delta > 0.0 {
            delta -= 2.0 * PI;
        } else if sweep && delta < 0.0 {
            delta += 2.0 * PI;
        }

        Some(PathSegment::Arc(EllipticalArc {
            center,
            rx,
            ry,
            phi,
            theta,
            delta,
        }))
    }
}

impl Segment for EllipticalArc {
    fn point(&self, t: f64) -> Point2 {
        let (sin, cos) = (self.theta + t * self.delta).sin_cos();
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let x = self.rx * cos;
        let y = self.ry * sin;
        Point2::new(
            cos_phi * x - sin_phi * y + self.center.x,
            sin_phi * x + cos_phi * y + self.center.y,
        )
    }

    fn length(&self, tolerance: f64) -> f64 {
        subdivided_length(self, tolerance)
    }
}

/// 两向量之间的有向夹角（弧度）
fn angle_between(u: &Vector2, v: &Vector2) -> f64 {
    (u.x * v.y - u.y * v.x).atan2(u.dot(v))
}

/// 递归二分求曲线弧长
///
/// 当两段折线长度与弦长之差不超过 `tolerance` 且达到最小深度时停止。
fn subdivided_length<S: Segment + ?Sized>(segment: &S, tolerance: f64) -> f64 {
    fn recurse<S: Segment + ?Sized>(
        segment: &S,
        t0: f64,
        t1: f64,
        p0: Point2,
        p1: Point2,
        tolerance: f64,
        depth: u32,
    ) -> f64 {
        let tm = (t0 + t1) / 2.0;
        let pm = segment.point(tm);
        let chord = (p1 - p0).norm();
        let halves = (pm - p0).norm() + (p1 - pm).norm();
        if depth < MAX_LENGTH_DEPTH && (halves - chord > tolerance || depth < MIN_LENGTH_DEPTH) {
            recurse(segment, t0, tm, p0, pm, tolerance, depth + 1)
                + recurse(segment, tm, t1, pm, p1, tolerance, depth + 1)
        } else {
            halves
        }
    }

    recurse(
        segment,
        0.0,
        1.0,
        segment.point(0.0),
        segment.point(1.0),
        tolerance,
        0,
    )
}
