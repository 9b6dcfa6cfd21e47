//! # Wordlight - Caret Highlighting Without an Editor
//!
//! Runs the highlight engines headlessly against a file, the way an editor
//! would after placing the caret, and prints the resulting tags.
//!
//! ## Quick Start
//!
//! ```bash
//! # Highlight the command at line 3, column 5
//! cargo run -- script.vsd --line 3 --column 5
//!
//! # Follow the file reference at a character offset
//! cargo run -- script.vsd --offset 120 --action
//!
//! # Machine-readable output
//! cargo run -- script.vsd --offset 42 --json
//! ```

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wordlight_buffer::{Position, SnapshotPoint, Span, TextBuffer, TextSnapshot};
use wordlight_core::{Config, ExtentResolver, HighlightEngine, HighlightProvider, TagSpan};

/// Wordlight - highlight the command or file reference under the caret
#[derive(Parser, Debug)]
#[command(name = "wordlight")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Script file to load
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Caret as a character offset
    #[arg(short, long, conflicts_with_all = ["line", "column"])]
    offset: Option<usize>,

    /// Caret line (1-indexed)
    #[arg(short, long)]
    line: Option<usize>,

    /// Caret column (1-indexed)
    #[arg(short, long)]
    column: Option<usize>,

    /// Config file instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Highlight the file reference under the caret and open it
    #[arg(short, long)]
    action: bool,

    /// Print tags as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Resolves the caret offset in `snapshot`. Defaults to the start.
    fn caret(&self, snapshot: &TextSnapshot) -> anyhow::Result<usize> {
        if let Some(offset) = self.offset {
            return Ok(offset);
        }
        let line = self.line.unwrap_or(1).max(1) - 1;
        let column = self.column.unwrap_or(1).max(1) - 1;
        let offset = snapshot.position_to_offset(Position::new(line, column))?;
        Ok(offset)
    }
}

/// What gets printed with `--json`.
#[derive(Debug, Serialize)]
struct Report {
    file: PathBuf,
    caret: usize,
    tags: Vec<TagSpan>,
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting Wordlight v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load(),
    };

    // Recomputations run on the blocking pool, bounded by the config
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .max_blocking_threads(config.engine.worker_threads.max(1))
        .enable_all()
        .build()?;

    let report = runtime.block_on(run(&args, &config))?;
    print!("{}", render(&report, args.json)?);

    Ok(())
}

async fn run(args: &Args, config: &Config) -> anyhow::Result<Report> {
    let buffer = TextBuffer::from_file(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let snapshot = buffer.snapshot();
    let offset = args.caret(&snapshot)?;
    let caret = SnapshotPoint::new(snapshot.clone(), offset)?;
    tracing::info!("Caret at {}", snapshot.offset_to_position(caret.offset)?);

    let provider = HighlightProvider::new(config)?;
    let content_type = provider.content_type().to_string();

    let tags = if args.action {
        let engine = provider
            .action_engine(&content_type)
            .context("No action engine for the configured content type")?;
        highlight(&engine, caret).await
    } else {
        let engine = provider
            .word_engine(&content_type)
            .context("No word engine for the configured content type")?;
        highlight(&engine, caret).await
    };

    Ok(Report {
        file: args.file.clone(),
        caret: offset,
        tags,
    })
}

/// Moves the caret, waits for the engine to settle and queries the whole
/// document.
async fn highlight<R: ExtentResolver>(
    engine: &HighlightEngine<R>,
    caret: SnapshotPoint,
) -> Vec<TagSpan> {
    let snapshot = caret.snapshot.clone();
    engine.notify_caret_moved(caret);
    engine.idle().await;
    engine.tags(&[Span::new(0, snapshot.len())], &snapshot)
}

fn render(report: &Report, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(report)? + "\n");
    }

    let mut out = String::new();
    for tag in &report.tags {
        out.push_str(&format!("{:?}\t{}\n", tag.kind, tag.span));
    }
    Ok(out)
}
