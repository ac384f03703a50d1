//! 输入节点约定
//!
//! 遍历器只依赖 `SourceNode`：去掉命名空间的标签名、字符串属性、有序子元素，
//! 以及收集全部后代文本的方法。默认实现基于 `roxmltree`。

/// 输入文档中的一个元素节点
pub trait SourceNode: Sized {
    /// 去掉命名空间后的标签名
    fn local_name(&self) -> &str;

    /// 按名称取属性值
    fn attr(&self, name: &str) -> Option<&str>;

    /// 全部属性（文档顺序）
    fn attrs(&self) -> Vec<(&str, &str)>;

    /// 子元素（忽略文本、注释等非元素节点）
    fn child_elements(&self) -> Vec<Self>;

    /// 按文档顺序拼接的全部后代文本
    fn text_content(&self) -> String;
}

impl<'a, 'input: 'a> SourceNode for roxmltree::Node<'a, 'input> {
    fn local_name(&self) -> &str {
        self.tag_name().name()
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attribute(name)
    }

    fn attrs(&self) -> Vec<(&str, &str)> {
        self.attributes().map(|a| (a.name(), a.value())).collect()
    }

    fn child_elements(&self) -> Vec<Self> {
        self.children().filter(|n| n.is_element()).collect()
    }

    fn text_content(&self) -> String {
        self.descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect()
    }
}

/// 解析 SVG 文本
///
/// 允许 DTD，图表工具导出的 SVG 常带有 `<!DOCTYPE svg ...>`。
pub fn parse_document(text: &str) -> Result<roxmltree::Document<'_>, roxmltree::Error> {
    let mut options = roxmltree::ParsingOptions::default();
    options.allow_dtd = true;
    roxmltree::Document::parse_with_options(text, options)
}
