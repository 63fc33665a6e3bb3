//! dxf2gpkglayers - 将 DXF 文件按图层拆分为 GeoPackage
//!
//! 每个输入文件旁生成 `<stem>-layers` 目录，目录中每个图层一个 `.gpkg`。

use anyhow::{Context, Result};
use clap::Parser;
use dxflayers_core::naming::{layers_dir_name, DXF_EXTENSION};
use dxflayers_file::{export_layers, ExportOptions, ReaderConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// 日志级别环境变量
const LOG_ENV: &str = "DXFLAYERS_LOG";

/// 所有参数都按输入文件处理，`-x.dxf`、`--help` 之类同样参与分类
#[derive(Parser, Debug)]
#[command(
    name = "dxf2gpkglayers",
    about = "Split DXF files into one GeoPackage per layer",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// 输入 DXF 文件
    #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("failed to initialise logging: {}", e);
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(2);
        }
    };
    let (good, bad) = classify(&cli.files);

    if !bad.is_empty() {
        for arg in &bad {
            println!("ERROR: not DXF file: \"{}\"", arg.display());
        }
        return ExitCode::from(2);
    }

    if good.is_empty() {
        println!("ERROR: no DXF file was given");
        return ExitCode::from(1);
    }

    let reader = ReaderConfig::from_env();
    for input in &good {
        if let Err(e) = run(input, reader) {
            error!("{:#}", e);
            return ExitCode::from(1);
        }
    }
    ExitCode::SUCCESS
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish(),
    )?;
    Ok(())
}

/// 导出单个输入文件
fn run(input: &Path, reader: ReaderConfig) -> Result<()> {
    let out_dir = output_dir(input);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("cannot create output directory {}", out_dir.display()))?;

    let options = ExportOptions::default()
        .with_out_dir(&out_dir)
        .with_verbose(true)
        .with_reader(reader);
    let report = export_layers(input, &options)
        .with_context(|| format!("export of {} failed", input.display()))?;

    info!(
        "{}: {} layers, {} features, {} warnings",
        input.display(),
        report.outputs.len(),
        report.feature_count(),
        report.warnings.len()
    );
    Ok(())
}

/// 输出目录：与输入文件同级的 `<stem>-layers`
fn output_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir_name = layers_dir_name(&stem);
    match input.parent() {
        Some(parent) => parent.join(dir_name),
        None => PathBuf::from(dir_name),
    }
}

/// 是否为扩展名 `.dxf`（忽略大小写）的普通文件
fn is_dxf_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(DXF_EXTENSION))
}

/// 将参数分为可处理与不可处理两类，各自保持原有顺序
fn classify(args: &[PathBuf]) -> (Vec<&Path>, Vec<&Path>) {
    args.iter()
        .map(PathBuf::as_path)
        .partition(|path| is_dxf_file(path))
}
