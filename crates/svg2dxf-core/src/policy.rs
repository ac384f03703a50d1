//! 非法输入的处理策略
//!
//! 所有解析函数都返回 `Result`，由调用方按解析位置决定是替换为默认值还是向上传播。
//!
//! | 位置                 | 处理                         |
//! |----------------------|------------------------------|
//! | 变换函数             | 该函数视为单位矩阵，继续     |
//! | 样式条目（无冒号）   | 跳过该条目                   |
//! | 描边颜色             | 回退为黑色                   |
//! | 描边线宽             | 省略线宽                     |
//! | 字号                 | 回退为 10pt                  |
//! | 几何属性缺失         | 取 0                         |
//! | 几何属性非数字       | 传播错误                     |
//! | 点列表               | 传播错误                     |
//! | 路径数据             | 传播错误                     |
//! | 未识别的元素         | 跳过该节点                   |

use crate::error::CoreError;
use tracing::{debug, warn};

/// 解析发生的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseSite {
    TransformToken,
    StyleEntry,
    StrokeColor,
    StrokeWidth,
    FontSize,
    GeometryAttribute,
    PointList,
    PathData,
    UnknownElement,
}

/// 遇到非法输入时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// 视为单位矩阵
    Identity,
    /// 丢弃该条目
    SkipEntry,
    /// 回退为黑色
    Black,
    /// 省略该属性
    Omit,
    /// 使用默认字号
    DefaultFontSize,
    /// 丢弃整个节点（不是错误）
    SkipNode,
    /// 作为硬错误返回
    Propagate,
}

impl ParseSite {
    pub const fn recovery(self) -> Recovery {
        match self {
            ParseSite::TransformToken => Recovery::Identity,
            ParseSite::StyleEntry => Recovery::SkipEntry,
            ParseSite::StrokeColor => Recovery::Black,
            ParseSite::StrokeWidth => Recovery::Omit,
            ParseSite::FontSize => Recovery::DefaultFontSize,
            ParseSite::UnknownElement => Recovery::SkipNode,
            ParseSite::GeometryAttribute | ParseSite::PointList | ParseSite::PathData => {
                Recovery::Propagate
            }
        }
    }

    /// 是否为宽松处理（不中断转换）
    pub const fn is_lenient(self) -> bool {
        !matches!(self.recovery(), Recovery::Propagate)
    }
}

/// 宽松位置：记录一条警告并返回 `fallback()`
pub fn recover_lenient<T>(
    site: ParseSite,
    result: Result<T, CoreError>,
    fallback: impl FnOnce() -> T,
) -> T {
    debug_assert!(site.is_lenient());
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(?site, recovery = ?site.recovery(), "{err}");
            fallback()
        }
    }
}

/// 硬错误位置：记录后原样返回错误
pub fn propagate<T>(site: ParseSite, result: Result<T, CoreError>) -> Result<T, CoreError> {
    debug_assert!(!site.is_lenient());
    result.inspect_err(|err| debug!(?site, "{err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_table() {
        assert_eq!(ParseSite::TransformToken.recovery(), Recovery::Identity);
        assert_eq!(ParseSite::StrokeColor.recovery(), Recovery::Black);
        assert_eq!(ParseSite::StrokeWidth.recovery(), Recovery::Omit);
        assert_eq!(ParseSite::PointList.recovery(), Recovery::Propagate);
        assert_eq!(ParseSite::PathData.recovery(), Recovery::Propagate);
        assert!(ParseSite::UnknownElement.is_lenient());
        assert!(!ParseSite::GeometryAttribute.is_lenient());
    }

    #[test]
    fn test_recover_lenient_site() {
        let value = recover_lenient(
            ParseSite::StrokeWidth,
            Err(CoreError::InvalidNumber("x".into())),
            || 7,
        );
        assert_eq!(value, 7);
        assert_eq!(recover_lenient(ParseSite::FontSize, Ok(12), || 10), 12);
    }

    #[test]
    fn test_recover_propagates() {
        let value: Result<i32, _> = propagate(
            ParseSite::PointList,
            Err(CoreError::InvalidPointPair("1;2".into())),
        );
        assert!(matches!(value, Err(CoreError::InvalidPointPair(_))));
        assert_eq!(propagate(ParseSite::PathData, Ok(3)).unwrap(), 3);
    }
}
