use anyhow::Context;
use clap::Parser;
use itsuki_zipper::utils::naming::next_unique_path;
use itsuki_zipper::{Zipper, ZipperConfig};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// 로그 레벨 환경 변수
const LOG_ENV_VAR: &str = "ITSUKI_ZIPPER_LOG";

#[derive(Debug, Parser)]
#[command(name = "itsuki-zipper", version, about = "Compress files and folders into a zip archive")]
struct Cli {
    /// Where to save the archive (default: next free archive.zip in the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Files and folders to compress
    #[arg(required = true)]
    sources: Vec<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ZipperConfig::from_file(path)?,
        None => ZipperConfig::load()?,
    };

    // 소스는 절대 경로로 넘김
    let cwd = env::current_dir().context("failed to read current directory")?;
    let sources: Vec<PathBuf> = cli
        .sources
        .iter()
        .map(|p| if p.is_absolute() { p.clone() } else { cwd.join(p) })
        .collect();

    let zipper = Zipper::new(config);
    let blob = match zipper.create_archive(&sources) {
        Ok(blob) => blob,
        Err(err) => {
            eprintln!("Error: {}", err.message());
            return Ok(ExitCode::FAILURE);
        }
    };

    let output = cli
        .output
        .unwrap_or_else(|| next_unique_path(&cwd, blob.suggested_filename()));
    fs::write(&output, blob.bytes())
        .with_context(|| format!("failed to save archive to {}", output.display()))?;
    println!("Zip saved\n {}", output.display());

    Ok(ExitCode::SUCCESS)
}
