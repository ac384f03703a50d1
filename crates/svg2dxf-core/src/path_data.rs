//! SVG 路径数据解析
//!
//! 把 `d` 属性解析为路径段序列。支持 `M L H V C S Q T A Z` 及其相对形式，
//! 命令可省略重复书写。`M` 只移动当前点，不产生路径段；`Z` 产生一条回到子路径
//! 起点的直线段。
//!
//! 参考 [SVG Path Specification](https://www.w3.org/TR/SVG11/paths.html#PathData)

use crate::error::CoreError;
use crate::math::{parse_number, Point2};
use crate::segment::{CubicBezier, EllipticalArc, LineSegment, PathSegment, QuadraticBezier};

/// 解析路径数据
pub fn parse_path_data(data: &str) -> Result<Vec<PathSegment>, CoreError> {
    let mut parser = PathDataParser::new(data);
    let mut segments = Vec::new();
    while let Some(segment) = parser.parse_command()? {
        segments.extend(segment);
    }
    Ok(segments)
}

/// 解析 `points` 属性（`polyline` / `polygon`）
///
/// 以空白分隔坐标对，每一对必须是恰好一个逗号分隔的两个数字。
pub fn parse_point_list(text: &str) -> Result<Vec<Point2>, CoreError> {
    text.split_whitespace()
        .map(|pair| {
            let mut parts = pair.split(',');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(x), Some(y), None) => Ok(Point2::new(parse_number(x)?, parse_number(y)?)),
                _ => Err(CoreError::InvalidPointPair(pair.to_string())),
            }
        })
        .collect()
}

/// 上一条曲线命令留下的控制点，用于 `S`/`T` 的反射
#[derive(Debug, Clone, Copy)]
enum LastControl {
    None,
    Cubic(Point2),
    Quad(Point2),
}

struct PathDataParser<'a> {
    input: &'a [u8],
    pos: usize,
    // 当前命令（用于省略重复命令字母的情况）
    op: Option<u8>,
    position: Point2,
    subpath_start: Point2,
    last_control: LastControl,
}

impl<'a> PathDataParser<'a> {
    fn new(data: &'a str) -> Self {
        Self {
            input: data.as_bytes(),
            pos: 0,
            op: None,
            position: Point2::origin(),
            subpath_start: Point2::origin(),
            last_control: LastControl::None,
        }
    }

    fn error(&self, message: impl Into<String>) -> CoreError {
        CoreError::InvalidPathData {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n' | b',')) {
            self.pos += 1;
        }
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos - start
    }

    // 解析一个数值，如 `-1.5e3`、`.5`
    fn parse_scalar(&mut self) -> Result<f64, CoreError> {
        self.skip_separators();
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let whole = self.skip_digits();
        let frac = if self.peek() == Some(b'.') {
            self.pos += 1;
            self.skip_digits()
        } else {
            0
        };
        if whole + frac == 0 {
            self.pos = start;
            return Err(self.error("number expected"));
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let exp_start = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.skip_digits() == 0 {
                self.pos = exp_start;
            }
        }
        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("invalid number"))?;
        text.parse::<f64>()
            .map_err(|_| self.error(format!("invalid number {text:?}")))
    }

    fn parse_flag(&mut self) -> Result<bool, CoreError> {
        self.skip_separators();
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            _ => Err(self.error("arc flag expected")),
        }
    }

    // 解析坐标对，相对命令加上当前点
    fn parse_point(&mut self, relative: bool) -> Result<Point2, CoreError> {
        let x = self.parse_scalar()?;
        let y = self.parse_scalar()?;
        if relative {
            Ok(Point2::new(self.position.x + x, self.position.y + y))
        } else {
            Ok(Point2::new(x, y))
        }
    }

    fn parse_op(&mut self) -> Result<Option<u8>, CoreError> {
        self.skip_separators();
        let byte = match self.peek() {
            None => return Ok(None),
            Some(byte) => byte,
        };
        match byte {
            b'M' | b'm' | b'L' | b'l' | b'H' | b'h' | b'V' | b'v' | b'C' | b'c' | b'S' | b's'
            | b'Q' | b'q' | b'T' | b't' | b'A' | b'a' | b'Z' | b'z' => {
                self.pos += 1;
                // moveto 之后重复的坐标对按 lineto 处理
                self.op = match byte {
                    b'M' => Some(b'L'),
                    b'm' => Some(b'l'),
                    b'Z' | b'z' => None,
                    other => Some(other),
                };
                Ok(Some(byte))
            }
            _ => match self.op {
                Some(op) => Ok(Some(op)),
                None => Err(self.error(format!("unexpected byte {:?}", byte as char))),
            },
        }
    }

    /// 解析一条命令，返回其产生的路径段（可能没有）；输入结束时返回 `None`
    fn parse_command(&mut self) -> Result<Option<Option<PathSegment>>, CoreError> {
        let op = match self.parse_op()? {
            None => return Ok(None),
            Some(op) => op,
        };
        let relative = op.is_ascii_lowercase();
        let start = self.position;

        let (segment, control) = match op.to_ascii_uppercase() {
            b'M' => {
                let dst = self.parse_point(relative)?;
                self.subpath_start = dst;
                self.position = dst;
                (None, LastControl::None)
            }
            b'L' => {
                let dst = self.parse_point(relative)?;
                self.line_to(start, dst)
            }
            b'H' => {
                let x = self.parse_scalar()?;
                let dst = if relative {
                    Point2::new(start.x + x, start.y)
                } else {
                    Point2::new(x, start.y)
                };
                self.line_to(start, dst)
            }
            b'V' => {
                let y = self.parse_scalar()?;
                let dst = if relative {
                    Point2::new(start.x, start.y + y)
                } else {
                    Point2::new(start.x, y)
                };
                self.line_to(start, dst)
            }
            b'C' => {
                let c1 = self.parse_point(relative)?;
                let c2 = self.parse_point(relative)?;
                let dst = self.parse_point(relative)?;
                self.position = dst;
                (
                    Some(PathSegment::Cubic(CubicBezier::new(start, c1, c2, dst))),
                    LastControl::Cubic(c2),
                )
            }
            b'S' => {
                let c1 = match self.last_control {
                    LastControl::Cubic(prev) => reflect(prev, start),
                    _ => start,
                };
                let c2 = self.parse_point(relative)?;
                let dst = self.parse_point(relative)?;
                self.position = dst;
                (
                    Some(PathSegment::Cubic(CubicBezier::new(start, c1, c2, dst))),
                    LastControl::Cubic(c2),
                )
            }
            b'Q' => {
                let c = self.parse_point(relative)?;
                let dst = self.parse_point(relative)?;
                self.position = dst;
                (
                    Some(PathSegment::Quadratic(QuadraticBezier::new(start, c, dst))),
                    LastControl::Quad(c),
                )
            }
            b'T' => {
                let c = match self.last_control {
                    LastControl::Quad(prev) => reflect(prev, start),
                    _ => start,
                };
                let dst = self.parse_point(relative)?;
                self.position = dst;
                (
                    Some(PathSegment::Quadratic(QuadraticBezier::new(start, c, dst))),
                    LastControl::Quad(c),
                )
            }
            b'A' => {
                let rx = self.parse_scalar()?;
                let ry = self.parse_scalar()?;
                let rotation = self.parse_scalar()?;
                let large_arc = self.parse_flag()?;
                let sweep = self.parse_flag()?;
                let dst = self.parse_point(relative)?;
                self.position = dst;
                (
                    EllipticalArc::from_endpoints(start, (rx, ry), rotation, large_arc, sweep, dst),
                    LastControl::None,
                )
            }
            b'Z' => {
                let dst = self.subpath_start;
                self.line_to(start, dst)
            }
            _ => return Err(self.error(format!("unsupported command {:?}", op as char))),
        };

        self.last_control = control;
        Ok(Some(segment))
    }

    fn line_to(&mut self, start: Point2, dst: Point2) -> (Option<PathSegment>, LastControl) {
        self.position = dst;
        (
            Some(PathSegment::Line(LineSegment::new(start, dst))),
            LastControl::None,
        )
    }
}

/// 关于 `center` 反射 `point`
fn reflect(point: Point2, center: Point2) -> Point2 {
    Point2::new(2.0 * center.x - point.x, 2.0 * center.y - point.y)
}
