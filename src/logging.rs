//! Tracing subscriber setup. `RUST_LOG` wins over the level picked from CLI flags.

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

/// How chatty a run is when `RUST_LOG` is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Warnings and errors only (`--quiet`).
    Quiet,
    /// Per-page and per-book progress from this crate; HTTP stack noise stays at warn.
    Normal,
}

impl Verbosity {
    pub fn directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "tululu_scrape=info,warn",
        }
    }
}

/// Filter from `RUST_LOG` when it is set and non-blank, else from `verbosity`.
/// A malformed `RUST_LOG` is an error rather than a silent fallback.
fn build_filter(rust_log: Option<&str>, verbosity: Verbosity) -> anyhow::Result<EnvFilter> {
    match rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid RUST_LOG {:?}", directives)),
        None => EnvFilter::try_new(verbosity.directive()).context("build default log filter"),
    }
}

/// Install a stderr `fmt` subscriber for the crawl.
pub fn init(verbosity: Verbosity) -> anyhow::Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = build_filter(rust_log.as_deref(), verbosity)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
