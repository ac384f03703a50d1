//! 路径采样
//!
//! 每个路径段按 `ceil(弧长 / 间隔)` 个点（至少 2 个）在参数空间均匀采样，
//! 不是按弧长均匀。所有段的采样点依次拼接成一条开放折线，段与段的衔接处不去重。

use crate::error::CoreError;
use crate::math::Point2;
use crate::segment::Segment;
use crate::transform::{transform_point, AffineMatrix};

/// 单个路径段的采样点上限
pub const MAX_SAMPLES_PER_SEGMENT: usize = 1 << 20;

/// 一个路径段的采样点数
///
/// 超过 `MAX_SAMPLES_PER_SEGMENT`（包括弧长溢出为无穷大）时返回错误。
pub fn sample_count(length: f64, interval: f64) -> Result<usize, CoreError> {
    let n = (length / interval).ceil();
    if n.is_nan() || n <= 2.0 {
        Ok(2)
    } else if n > MAX_SAMPLES_PER_SEGMENT as f64 {
        Err(CoreError::TooManySamples {
            length,
            limit: MAX_SAMPLES_PER_SEGMENT,
        })
    } else {
        Ok(n as usize)
    }
}

/// 把路径段序列采样为折线
///
/// 每个点先经过 `matrix`（若有），再乘以 `unit_scale`。
pub fn flatten_segments<S: Segment>(
    segments: &[S],
    matrix: Option<&AffineMatrix>,
    interval: f64,
    tolerance: f64,
    unit_scale: f64,
) -> Result<Vec<Point2>, CoreError> {
    let mut points = Vec::new();
    for segment in segments {
        let n = sample_count(segment.length(tolerance), interval)?;
        points.reserve(n);
        for i in 0..n {
            let t = i as f64 / (n - 1) as f64;
            let p = transform_point(matrix, segment.point(t));
            points.push(Point2::new(p.x * unit_scale, p.y * unit_scale));
        }
    }
    Ok(points)
}
