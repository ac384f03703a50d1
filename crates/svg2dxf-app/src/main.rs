//! svg2dxf 命令行入口
//!
//! 读取一个 SVG 文件，写出同名的 DXF 文件（或 `-o` 指定的路径）。

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use svg2dxf_core::config::ConversionConfig;
use svg2dxf_file::{convert_file, ConversionSummary};

#[derive(Parser, Debug)]
#[command(name = "svg2dxf", version, about = "Convert SVG drawings to DXF", long_about = None)]
struct Args {
    /// 输入的 SVG 文件
    input: PathBuf,

    /// 输出的 DXF 文件，默认与输入同名
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON 格式的参数文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 每磅对应的 DXF 长度
    #[arg(long)]
    pt_to_dxf: Option<f64>,

    /// 路径采样间隔
    #[arg(long)]
    sampling_interval: Option<f64>,

    /// SVG 单位到 DXF 长度的缩放
    #[arg(long)]
    unit_scale: Option<f64>,

    /// 以 JSON 输出统计
    #[arg(long, default_value_t = false)]
    json: bool,

    /// 日志详细程度（-v DEBUG，-vv TRACE）
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("dxf"))
    }

    fn load_config(&self) -> Result<ConversionConfig> {
        let mut config = match &self.config {
            Some(path) => ConversionConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ConversionConfig::default(),
        };
        if let Some(value) = self.pt_to_dxf {
            config.pt_to_dxf = value;
        }
        if let Some(value) = self.sampling_interval {
            config.path_sampling_interval = value;
        }
        if let Some(value) = self.unit_scale {
            config.svg_unit_to_dxf = value;
        }
        config.validate()?;
        Ok(config)
    }
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn summary_line(output: &Path, summary: &ConversionSummary) -> String {
    let mut line = format!(
        "{}: {} circles, {} polylines, {} lines, {} texts",
        output.display(),
        summary.circles,
        summary.polylines,
        summary.lines,
        summary.texts
    );
    if !summary.skipped.is_empty() {
        let skipped: Vec<String> = summary
            .skipped
            .iter()
            .map(|(tag, count)| format!("{tag}×{count}"))
            .collect();
        line.push_str(&format!(" (skipped {})", skipped.join(", ")));
    }
    if !summary.extents.is_empty() {
        line.push_str(&format!(
            ", extents {:.3} x {:.3}",
            summary.extents.width(),
            summary.extents.height()
        ));
    }
    line
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(log_level(args.verbose))
            .with_writer(std::io::stderr)
            .finish(),
    )?;

    let config = args.load_config()?;
    debug!(?config, "configuration");

    let output = args.output_path();
    let summary = convert_file(&args.input, &output, &config)
        .with_context(|| format!("failed to convert {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary_line(&output, &summary));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use svg2dxf_core::math::Point2;

    #[test]
    fn test_default_output_path() {
        let args = Args::parse_from(["svg2dxf", "diagram.svg"]);
        assert_eq!(args.output_path(), PathBuf::from("diagram.dxf"));
        let args = Args::parse_from(["svg2dxf", "diagram.svg", "-o", "out/x.dxf"]);
        assert_eq!(args.output_path(), PathBuf::from("out/x.dxf"));
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "svg2dxf",
            "a.svg",
            "--sampling-interval",
            "2.5",
            "--unit-scale",
            "0.5",
            "-vv",
        ]);
        let config = args.load_config().unwrap();
        assert_eq!(config.path_sampling_interval, 2.5);
        assert_eq!(config.svg_unit_to_dxf, 0.5);
        assert_eq!(config.pt_to_dxf, 25.0);
        assert_eq!(log_level(args.verbose), Level::TRACE);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = Args::parse_from(["svg2dxf", "a.svg", "--pt-to-dxf=0"]);
        assert!(args.load_config().is_err());
    }

    #[test]
    fn test_summary_line() {
        let mut summary = ConversionSummary {
            circles: 1,
            texts: 2,
            ..Default::default()
        };
        summary.skipped.insert("ellipse".to_string(), 3);
        assert_eq!(
            summary_line(Path::new("a.dxf"), &summary),
            "a.dxf: 1 circles, 0 polylines, 0 lines, 2 texts (skipped ellipse×3)"
        );
    }

    #[test]
    fn test_summary_line_with_extents() {
        let mut summary = ConversionSummary {
            lines: 1,
            ..Default::default()
        };
        summary.extents.expand_to_include(&Point2::new(-1.0, 2.0));
        summary.extents.expand_to_include(&Point2::new(3.5, 4.0));
        assert_eq!(
            summary_line(Path::new("b.dxf"), &summary),
            "b.dxf: 0 circles, 0 polylines, 1 lines, 0 texts, extents 4.500 x 2.000"
        );
    }
}
