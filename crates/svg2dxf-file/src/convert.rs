//! SVG → DXF 转换入口

use crate::dxf_io::DxfSink;
use crate::emitter::{ConversionSummary, ShapeEmitter};
use crate::error::FileError;
use crate::node::{parse_document, SourceNode};
use crate::sink::DrawingSink;
use std::path::Path;
use svg2dxf_core::config::ConversionConfig;
use tracing::{info, warn};

/// 从根节点开始遍历，写入任意输出端
pub fn convert_node<N, S>(
    root: &N,
    sink: &mut S,
    config: &ConversionConfig,
) -> Result<ConversionSummary, FileError>
where
    N: SourceNode,
    S: DrawingSink + ?Sized,
{
    if root.local_name() != "svg" {
        warn!(tag = root.local_name(), "root element is not <svg>");
    }
    let mut emitter = ShapeEmitter::new(sink, config);
    emitter.walk(root, None)?;
    Ok(emitter.finish())
}

fn convert_to_sink(
    svg: &str,
    config: &ConversionConfig,
) -> Result<(DxfSink, ConversionSummary), FileError> {
    config.validate()?;
    let document = parse_document(svg)?;
    let mut sink = DxfSink::new(config.dxf_version);
    let summary = convert_node(&document.root_element(), &mut sink, config)?;
    Ok((sink, summary))
}

/// 转换内存中的 SVG 文本
pub fn convert_str(
    svg: &str,
    config: &ConversionConfig,
) -> Result<(dxf::Drawing, ConversionSummary), FileError> {
    let (sink, summary) = convert_to_sink(svg, config)?;
    Ok((sink.into_drawing(), summary))
}

/// 读取 SVG 文件并保存为 DXF
pub fn convert_file(
    input: &Path,
    output: &Path,
    config: &ConversionConfig,
) -> Result<ConversionSummary, FileError> {
    let is_dxf = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("dxf"));
    if !is_dxf {
        return Err(FileError::InvalidFormat(format!(
            "output must have a .dxf extension: {}",
            output.display()
        )));
    }

    let text = std::fs::read_to_string(input)?;
    let (sink, summary) = convert_to_sink(&text, config)?;
    sink.save(output)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        entities = summary.total(),
        skipped = summary.skipped_count(),
        "conversion finished"
    );
    Ok(summary)
}
