use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use sheetchart::chart::{ChartKind, ChartRequest};
use sheetchart::config::SheetchartConfig;
use sheetchart::services::{Principal, Upload};
use sheetchart::AppContext;

/// Columns listed before the "+N more" summary in `inspect`.
const PREVIEW_COLUMNS: usize = 6;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    /// TOML config file; SHEETCHART_* variables override it
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a file and describe the resulting dataset
    Inspect {
        file: PathBuf,
        #[clap(short, long, default_value = "local")]
        owner: String,
    },
    /// Ingest a file and build one chart from it
    Chart {
        file: PathBuf,
        #[clap(short, long)]
        kind: String,
        #[clap(short, long)]
        x: String,
        #[clap(short, long)]
        y: String,
        #[clap(short, long)]
        title: String,
        #[clap(short, long, default_value = "local")]
        owner: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    let config = SheetchartConfig::load(args.config.as_deref())?;
    let ctx = AppContext::new(config);

    match args.command {
        Commands::Inspect { file, owner } => {
            info!("Inspecting {}", file.display());
            let principal = Principal::user(owner);
            let bytes = read_input(&file)?;
            let dataset = ctx.upload(&principal, upload_for(&file, &bytes)).await?;

            let (shown, remaining) = dataset.column_preview(PREVIEW_COLUMNS);
            let mut columns = shown.join(", ");
            if remaining > 0 {
                columns.push_str(&format!(" +{} more", remaining));
            }
            println!("dataset:  {}", dataset.id());
            println!("source:   {}", dataset.source_name());
            println!("rows:     {}", dataset.row_count());
            println!("columns:  {} ({})", dataset.column_count(), columns);
            println!(
                "numeric:  {}",
                ctx.chart_service().numeric_columns(&dataset).join(", ")
            );
        }
        Commands::Chart {
            file,
            kind,
            x,
            y,
            title,
            owner,
        } => {
            let kind: ChartKind = kind.parse().map_err(anyhow::Error::msg)?;
            info!("Building {} chart from {}", kind, file.display());
            let principal = Principal::user(owner);
            let bytes = read_input(&file)?;
            let dataset = ctx.upload(&principal, upload_for(&file, &bytes)).await?;

            let built = ctx
                .create_chart(
                    &principal,
                    dataset.id(),
                    ChartRequest::new(title, kind, x, y),
                )
                .await?;
            let output = json!({
                "descriptor": built.descriptor,
                "payload": built.payload,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn upload_for<'a>(path: &'a Path, bytes: &'a [u8]) -> Upload<'a> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    Upload::new(bytes, file_name)
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_deref()
        .unwrap_or("info")
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("calamine=warn,{}", log_level)))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
