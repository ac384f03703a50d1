//! 2D仿射变换
//!
//! 矩阵以 `(a, c, e, b, d, f)` 六个系数表示：
//!
//! ```text
//! x' = a·x + c·y + e
//! y' = b·x + d·y + f
//! ```
//!
//! 嵌套变换的组合顺序与 SVG 一致：子节点坐标先经过子矩阵，再经过父矩阵，
//! 即 `parent.then(&child)`。

use crate::error::CoreError;
use crate::math::{parse_number, Point2};
use crate::policy::{recover_lenient, ParseSite};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::trace;

/// 变换函数的匹配模式：`name(args)`，参数中不允许出现右括号
static TRANSFORM_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(matrix|translate|scale|rotate|skewX|skewY)\((.*?)\)")
        .expect("transform token pattern is valid")
});

/// 2D仿射变换矩阵（不可变值类型）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineMatrix {
    a: f64,
    c: f64,
    e: f64,
    b: f64,
    d: f64,
    f: f64,
}

/// 从矩阵中近似分解出的旋转和缩放
///
/// 含有切变时该分解是有损的。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationScale {
    /// 旋转角（度，逆时针为正）
    pub rotation_degrees: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl RotationScale {
    /// 两轴缩放的平均值，用于圆半径和文字高度
    pub fn average_scale(&self) -> f64 {
        (self.scale_x + self.scale_y) / 2.0
    }
}

impl AffineMatrix {
    /// 单位变换
    pub const IDENTITY: AffineMatrix = AffineMatrix::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0);

    /// 按 `(a, c, e, b, d, f)` 顺序创建
    pub const fn new(a: f64, c: f64, e: f64, b: f64, d: f64, f: f64) -> Self {
        Self { a, c, e, b, d, f }
    }

    /// 按 SVG `matrix(a, b, c, d, e, f)` 的参数顺序创建
    pub const fn from_svg_matrix(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self::new(a, c, e, b, d, f)
    }

    /// 创建平移变换
    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, tx, 0.0, 1.0, ty)
    }

    /// 创建缩放变换（绕原点）
    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, 0.0, sy, 0.0)
    }

    /// 创建旋转变换（绕原点，角度为度）
    pub fn rotation(angle_degrees: f64) -> Self {
        let (sin, cos) = angle_degrees.to_radians().sin_cos();
        Self::new(cos, -sin, 0.0, sin, cos, 0.0)
    }

    /// `rotate(angle, cx, cy)` 的矩阵
    ///
    /// 组合为 translate(-cx,-cy) ∘ rotate(angle) ∘ translate(cx,cy)。
    pub fn rotation_around(angle_degrees: f64, cx: f64, cy: f64) -> Self {
        Self::translation(-cx, -cy)
            .then(&Self::rotation(angle_degrees))
            .then(&Self::translation(cx, cy))
    }

    /// X 方向切变（角度为度）
    pub fn skew_x(angle_degrees: f64) -> Self {
        Self::new(1.0, angle_degrees.to_radians().tan(), 0.0, 0.0, 1.0, 0.0)
    }

    /// Y 方向切变（角度为度）
    pub fn skew_y(angle_degrees: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, angle_degrees.to_radians().tan(), 1.0, 0.0)
    }

    /// 组合两个变换（self 在后，other 在前）
    pub fn then(&self, other: &AffineMatrix) -> Self {
        let (a1, c1, e1, b1, d1, f1) = (self.a, self.c, self.e, self.b, self.d, self.f);
        let (a2, c2, e2, b2, d2, f2) = (other.a, other.c, other.e, other.b, other.d, other.f);
        Self {
            a: a1 * a2 + c1 * b2,
            c: a1 * c2 + c1 * d2,
            e: a1 * e2 + c1 * f2 + e1,
            b: b1 * a2 + d1 * b2,
            d: b1 * c2 + d1 * d2,
            f: b1 * e2 + d1 * f2 + f1,
        }
    }

    /// 变换一个点
    pub fn apply(&self, point: &Point2) -> Point2 {
        Point2::new(
            self.a * point.x + self.c * point.y + self.e,
            self.b * point.x + self.d * point.y + self.f,
        )
    }

    /// 按 `(a, c, e, b, d, f)` 顺序返回系数
    pub fn coefficients(&self) -> [f64; 6] {
        [self.a, self.c, self.e, self.b, self.d, self.f]
    }

    /// 近似分解为旋转角和两轴缩放
    pub fn decompose(&self) -> RotationScale {
        RotationScale {
            rotation_degrees: self.b.atan2(self.a).to_degrees(),
            scale_x: (self.a * self.a + self.b * self.b).sqrt(),
            scale_y: (self.c * self.c + self.d * self.d).sqrt(),
        }
    }

    /// 解析 SVG `transform` 属性
    ///
    /// 各函数从左到右依次右乘到累积矩阵上。未知或参数非法的函数按单位矩阵处理，
    /// 因此该函数从不失败。
    pub fn parse_transform_list(text: &str) -> Self {
        let text = text.replace('\n', "");
        TRANSFORM_TOKEN
            .captures_iter(&text)
            .fold(Self::IDENTITY, |acc, caps| {
                let name = &caps[1];
                let args = &caps[2];
                let token = recover_lenient(
                    ParseSite::TransformToken,
                    Self::parse_token(name, args),
                    || Self::IDENTITY,
                );
                trace!(function = name, args, ?token, "transform token");
                acc.then(&token)
            })
    }

    /// 解析单个变换函数
    pub fn parse_token(name: &str, args: &str) -> Result<Self, CoreError> {
        let nums = args
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(parse_number)
            .collect::<Result<Vec<f64>, _>>()?;

        let first = || {
            nums.first().copied().ok_or_else(|| {
                CoreError::InvalidTransform(format!("{name}() requires at least one argument"))
            })
        };

        match name {
            "matrix" => match nums.as_slice() {
                &[a, b, c, d, e, f] => Ok(Self::from_svg_matrix(a, b, c, d, e, f)),
                _ => Err(CoreError::InvalidTransform(format!(
                    "matrix() requires 6 arguments, got {}",
                    nums.len()
                ))),
            },
            "translate" => {
                let tx = first()?;
                let ty = nums.get(1).copied().unwrap_or(0.0);
                Ok(Self::translation(tx, ty))
            }
            "scale" => {
                let sx = first()?;
                let sy = nums.get(1).copied().unwrap_or(sx);
                Ok(Self::scale(sx, sy))
            }
            "rotate" => {
                let angle = first()?;
                match nums.as_slice() {
                    &[_, cx, cy, ..] => Ok(Self::rotation_around(angle, cx, cy)),
                    _ => Ok(Self::rotation_around(angle, 0.0, 0.0)),
                }
            }
            "skewX" => Ok(Self::skew_x(first()?)),
            "skewY" => Ok(Self::skew_y(first()?)),
            other => Err(CoreError::InvalidTransform(format!(
                "unknown transform function {other:?}"
            ))),
        }
    }
}

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul for AffineMatrix {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.then(&rhs)
    }
}

/// 把子节点的 `transform` 组合到继承矩阵上
///
/// 两者都不存在时返回 `None`，调用方据此跳过点变换。
/// 空字符串与缺失等价。
pub fn compose(parent: Option<AffineMatrix>, child: Option<&str>) -> Option<AffineMatrix> {
    let child = child.filter(|s| !s.is_empty());
    if child.is_none() && parent.is_none() {
        return None;
    }
    let child_matrix = child
        .map(AffineMatrix::parse_transform_list)
        .unwrap_or(AffineMatrix::IDENTITY);
    match parent {
        None => Some(child_matrix),
        Some(parent) => Some(parent.then(&child_matrix)),
    }
}

/// 对可选矩阵变换点，`None` 时原样返回
#[inline]
pub fn transform_point(matrix: Option<&AffineMatrix>, point: Point2) -> Point2 {
    match matrix {
        Some(m) => m.apply(&point),
        None => point,
    }
}
