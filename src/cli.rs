//! CLI parsing and orchestration. Parses args, merges config, runs the download, maps errors to exit codes.

use crate::config;
use crate::download::{download, DownloadError, DownloadOptions, DownloadSummary};
use crate::model::NovelSource;
use crate::output::{FallbackTable, OutputError, OutputWriter};
use crate::scraper::{ScraperError, Site};
use crate::PoliteClient;
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Exit status for a run stopped by Ctrl-C.
pub const EXIT_INTERRUPTED: i32 = 130;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Scraper(#[from] ScraperError),

    #[error("{0}")]
    Output(#[from] OutputError),

    #[error("{0}")]
    Download(#[from] DownloadError),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::Download(DownloadError::Interrupted) => EXIT_INTERRUPTED,
            _ => 1,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "novelfetch", version)]
#[command(about = "Fetch every chapter of a Shosetsuka ni Narou or Hameln novel into text files")]
#[command(
    after_help = "Config file keys (output_dir, user_agent, timeout_secs, legacy_fallback) are documented in the README. CLI flags override config."
)]
pub struct Args {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Work identifier: ncode for narou (e.g. n2267be), novel id for hameln (e.g. 157686).
    pub work_id: String,

    /// Chapter to start from (1-based). Use to resume an interrupted run.
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub start: u32,

    /// Also write Shift_JIS copies (CRLF line endings) under <work_id>/sjis/.
    #[arg(short = 'J', long = "sjis", alias = "to-sjis")]
    pub sjis: bool,

    /// Directory in which <work_id>/ is created (overrides config; default: current directory).
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Suppress progress output (errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging and full error chain.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Site selection: exactly one of --narou / --hameln.
#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SiteArgs {
    /// Fetch from Shosetsuka ni Narou (ncode.syosetu.com).
    #[arg(short = 'N', long)]
    pub narou: bool,

    /// Fetch from Hameln (syosetu.org).
    #[arg(short = 'H', long)]
    pub hameln: bool,
}

impl SiteArgs {
    pub fn site(&self) -> Site {
        if self.hameln {
            Site::Hameln
        } else {
            Site::Narou
        }
    }
}

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Entry point for the CLI. Returns the run summary; Err carries exit code and message.
pub fn run(args: &Args, cancel: Arc<AtomicBool>) -> Result<DownloadSummary, CliRunError> {
    let source = NovelSource::new(args.site.site(), &args.work_id)?;

    let config = config::load_config()
        .map_err(|e| CliRunError::InvalidInput(format!("{:#}", e)))?
        .unwrap_or_default();

    let base_dir = args
        .output_dir
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let timeout_secs = args
        .timeout
        .or(config.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let user_agent = args.user_agent.clone().or_else(|| config.user_agent.clone());

    let fallback = if args.sjis {
        let mut table = FallbackTable::default();
        if let Some(extra) = &config.legacy_fallback {
            table.extend_from_strings(extra)?;
        }
        Some(table)
    } else {
        None
    };

    let mut builder = PoliteClient::builder().timeout_secs(timeout_secs);
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    let mut client = builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))?;

    let writer = OutputWriter::create(base_dir.join(source.work_id()), args.sjis)?;
    tracing::info!(
        site = %source.site(),
        work = source.work_id(),
        root = %writer.root().display(),
        start = args.start,
        legacy = writer.legacy(),
        "starting download"
    );

    let progress_state: RefCell<Option<indicatif::ProgressBar>> = RefCell::new(None);
    let progress_cb = |n: u32, total: u32| {
        if total == 0 {
            return;
        }
        let mut state = progress_state.borrow_mut();
        let pb = state.get_or_insert_with(|| {
            let bar = indicatif::ProgressBar::new(total as u64);
            if let Ok(style) = indicatif::ProgressStyle::default_bar()
                .template("{spinner} {msg} [{bar:40}] {pos}/{len} ({elapsed})")
            {
                bar.set_style(
                    style
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                        .progress_chars("█▉▊▋▌▍▎▏ "),
                );
            }
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        pb.set_position(n as u64);
        pb.set_message(format!("Writing chapter {}/{}", n, total));
    };
    let progress: Option<&dyn Fn(u32, u32)> = if args.quiet { None } else { Some(&progress_cb) };

    let options = DownloadOptions {
        start: args.start,
        legacy: fallback.as_ref(),
        progress,
        cancel: Some(cancel),
    };
    let result = download(&mut client, &source, &writer, &options);

    if let Some(pb) = progress_state.borrow_mut().take() {
        pb.disable_steady_tick();
        pb.finish_and_clear();
    }

    let summary = result?;
    if !args.quiet {
        match (summary.first, summary.last) {
            (Some(first), Some(last)) => eprintln!(
                "Done. Wrote chapters {}-{} of {} to {}",
                first,
                last,
                summary.total,
                writer.root().display()
            ),
            _ => eprintln!(
                "Done. Nothing to write: start {} is past the last chapter ({}).",
                args.start, summary.total
            ),
        }
    }
    Ok(summary)
}
