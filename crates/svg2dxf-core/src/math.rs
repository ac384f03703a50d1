//! 数学基础类型
//!
//! 基于 nalgebra 提供的点/向量类型别名，以及浮点比较和数值解析工具。

use crate::error::CoreError;
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// 2D点类型
pub type Point2 = na::Point2<f64>;

/// 2D向量类型
pub type Vector2 = na::Vector2<f64>;

/// 数值容差，用于几何比较
pub const EPSILON: f64 = 1e-10;

/// 判断两个浮点数是否近似相等
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    approx_eq_eps(a, b, EPSILON)
}

/// 使用指定容差判断两个浮点数是否近似相等
#[inline]
pub fn approx_eq_eps(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}

/// 判断两个2D点是否近似相等
#[inline]
pub fn points_approx_eq(a: &Point2, b: &Point2) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

/// 解析一个十进制数（允许首尾空白）
pub fn parse_number(text: &str) -> Result<f64, CoreError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| CoreError::InvalidNumber(text.to_string()))
}

/// 2D包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    /// 创建空的包围盒（无效状态）
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::MAX, f64::MAX),
            max: Point2::new(f64::MIN, f64::MIN),
        }
    }

    /// 是否仍为空（未包含任何点）
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// 扩展包围盒以包含指定点
    pub fn expand_to_include(&mut self, point: &Point2) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// 获取宽度
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// 获取高度
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

impl Default for BoundingBox2 {
    fn default() -> Self {
        Self::empty()
    }
}
