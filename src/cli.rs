//! CLI parsing and orchestration. Parses args, resolves the page range, crawls, and writes the
//! JSON catalog. Maps errors to exit codes.

use crate::config::{self, Config};
use crate::logging::Verbosity;
use crate::output::{write_catalog, OutputError};
use crate::scraper::{
    explicit_page_range, resolve_page_range, CatalogCrawler, CrawlOptions, Endpoints,
    PoliteClient, ScraperError, DEFAULT_CATALOG_URL, DEFAULT_DOWNLOAD_URL, DEFAULT_SITE_URL,
};
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_JSON_NAME: &str = "books.json";

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Scraper(#[from] ScraperError),

    #[error("{0}")]
    Output(#[from] OutputError),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Scraper(_) => 2,
            CliRunError::Output(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tululu-scrape")]
#[command(about = "Download books, covers and metadata from a tululu.org catalog into a JSON catalog")]
#[command(
    after_help = "Config file keys (dest_folder, json_name, user_agent, request_delay_secs, timeout_secs, catalog_url, site_url, download_url) are read from ./tululu-scrape.toml or the user config dir. CLI flags override config."
)]
pub struct Args {
    /// First catalog page to crawl (1-based).
    #[arg(short = 's', long, default_value_t = 1, allow_negative_numbers = true)]
    pub start_page: i64,

    /// Last catalog page to crawl (inclusive). Default: last page advertised by the catalog.
    #[arg(short = 'e', long, allow_negative_numbers = true)]
    pub end_page: Option<i64>,

    /// Destination root for books/, images/ and the JSON catalog. Default: config or current directory.
    #[arg(short = 'd', long)]
    pub dest_folder: Option<PathBuf>,

    /// Do not download cover images.
    #[arg(long)]
    pub skip_imgs: bool,

    /// Do not download book texts.
    #[arg(long)]
    pub skip_txts: bool,

    /// File name of the JSON catalog, written inside the destination root.
    #[arg(long)]
    pub json_name: Option<String>,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Delay between requests in seconds (overrides config; default 1).
    #[arg(long)]
    pub delay: Option<u64>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Resolve the page range and print the plan without downloading or writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Suppress progress output (warnings and errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Print verbose error chain.
    #[arg(long)]
    pub verbose: bool,
}

impl Args {
    /// Log verbosity used when RUST_LOG is unset.
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }
}

/// Reject bad bounds before any request is made. Without an end page only the start is checked.
fn validate_page_args(start: i64, end: Option<i64>) -> Result<(), CliRunError> {
    explicit_page_range(start, end.unwrap_or(start))
        .map(|_| ())
        .map_err(|e| CliRunError::InvalidInput(e.to_string()))
}

/// Catalog file name must be a plain file name so it stays inside the destination root.
fn validate_json_name(name: &str) -> Result<(), CliRunError> {
    let path = std::path::Path::new(name);
    let is_plain = path.file_name().map(|f| f == path.as_os_str()).unwrap_or(false);
    if name.trim().is_empty() || !is_plain {
        return Err(CliRunError::InvalidInput(format!(
            "Invalid --json-name: '{}'. Use a plain file name such as books.json.",
            name
        )));
    }
    Ok(())
}

fn endpoints_from_config(config: Option<&Config>) -> Result<Endpoints, CliRunError> {
    let pick = |value: Option<&String>, default: &'static str| {
        value.map(String::as_str).unwrap_or(default).to_string()
    };
    let catalog = pick(config.and_then(|c| c.catalog_url.as_ref()), DEFAULT_CATALOG_URL);
    let site = pick(config.and_then(|c| c.site_url.as_ref()), DEFAULT_SITE_URL);
    let download = pick(config.and_then(|c| c.download_url.as_ref()), DEFAULT_DOWNLOAD_URL);
    Endpoints::new(&catalog, &site, &download).map_err(|e| match e {
        ScraperError::InvalidUrl { input, reason } => CliRunError::InvalidInput(format!(
            "Invalid endpoint URL in config: {}: {}",
            input, reason
        )),
        other => CliRunError::Scraper(other),
    })
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    validate_page_args(args.start_page, args.end_page)?;

    let config = config::load_config().map_err(CliRunError::InvalidInput)?;
    run_with_config(args, config.as_ref())
}

/// [`run`] with an already loaded config; no config file is searched for.
pub fn run_with_config(args: &Args, config: Option<&Config>) -> Result<(), CliRunError> {
    validate_page_args(args.start_page, args.end_page)?;

    let dest_root: PathBuf = args
        .dest_folder
        .clone()
        .or_else(|| config.and_then(|c| c.dest_folder.clone()))
        .unwrap_or_else(|| PathBuf::from("."));
    let json_name = args
        .json_name
        .clone()
        .or_else(|| config.and_then(|c| c.json_name.clone()))
        .unwrap_or_else(|| DEFAULT_JSON_NAME.to_string());
    validate_json_name(&json_name)?;
    let output_path = dest_root.join(&json_name);

    let endpoints = endpoints_from_config(config)?;

    const DEFAULT_DELAY_SECS: u64 = 1;
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    let delay_secs = args
        .delay
        .or_else(|| config.and_then(|c| c.request_delay_secs))
        .unwrap_or(DEFAULT_DELAY_SECS);
    let timeout_secs = args
        .timeout
        .or_else(|| config.and_then(|c| c.timeout_secs))
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| config.and_then(|c| c.user_agent.clone()));

    let mut builder = PoliteClient::builder()
        .delay_secs(delay_secs)
        .timeout_secs(timeout_secs);
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    let mut client = builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))?;

    let range = resolve_page_range(&mut client, &endpoints, args.start_page, args.end_page)
        .map_err(|e| match e {
            ScraperError::InvalidRange { .. } => CliRunError::InvalidInput(e.to_string()),
            other => CliRunError::Scraper(other),
        })?;

    if args.dry_run {
        eprintln!("Pages: {}-{} ({} pages)", range.start(), range.end(), range.len());
        eprintln!("Destination: {}", dest_root.display());
        eprintln!("Output: {}", output_path.display());
        return Ok(());
    }

    std::fs::create_dir_all(&dest_root).map_err(|e| {
        CliRunError::InvalidInput(format!(
            "Cannot create destination folder {}: {}",
            dest_root.display(),
            e
        ))
    })?;

    let progress_state: RefCell<Option<indicatif::ProgressBar>> = RefCell::new(None);
    let progress_cb = |page: u32, last: u32| {
        let mut state = progress_state.borrow_mut();
        let pb = state.get_or_insert_with(|| {
            let bar = indicatif::ProgressBar::new(range.len() as u64);
            let style = indicatif::ProgressStyle::default_bar()
                .template("{spinner} {msg} [{bar:40}] {pos}/{len} ({elapsed})")
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .progress_chars("█▉▊▋▌▍▎▏ ");
            bar.set_style(style);
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        pb.set_position((page - range.start()) as u64);
        pb.set_message(format!("Catalog page {}/{}", page, last));
    };
    let progress: Option<&dyn Fn(u32, u32)> = if args.quiet { None } else { Some(&progress_cb) };

    let options = CrawlOptions {
        dest_root: dest_root.clone(),
        skip_texts: args.skip_txts,
        skip_images: args.skip_imgs,
        progress,
    };
    let result = CatalogCrawler::new(&mut client, &endpoints).crawl(range, &options);

    if let Some(pb) = progress_state.borrow_mut().take() {
        pb.disable_steady_tick();
        pb.finish_and_clear();
    }
    let (records, summary) = result?;

    write_catalog(&output_path, &records)?;

    tracing::info!(
        books = records.len(),
        skipped = summary.skipped(),
        withdrawn = summary.withdrawn,
        pages = summary.pages_crawled,
        "done"
    );
    if !args.quiet {
        eprintln!("Wrote {}", output_path.display());
    }
    Ok(())
}
