//! Optional config file loading. Search order: ./tululu-scrape.toml, then
//! $XDG_CONFIG_HOME/tululu-scrape/config.toml (or ~/.config/tululu-scrape/config.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};

const LOCAL_CONFIG: &str = "tululu-scrape.toml";

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct Config {
    /// Destination root when --dest-folder is not set. Relative to CWD.
    pub dest_folder: Option<PathBuf>,
    /// Output JSON file name when --json-name is not set.
    pub json_name: Option<String>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Delay in seconds between requests.
    pub request_delay_secs: Option<u64>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Catalog listing URL; the page number is appended.
    pub catalog_url: Option<String>,
    /// Base URL for book detail pages.
    pub site_url: Option<String>,
    /// Text download endpoint.
    pub download_url: Option<String>,
}

/// Search order: (1) ./tululu-scrape.toml, (2) <config dir>/tululu-scrape/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join(LOCAL_CONFIG)];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("tululu-scrape").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            return load_config_file(path).map(Some);
        }
    }
    Ok(None)
}

pub fn load_config_file(path: &Path) -> Result<Config, String> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
    let config: Config =
        toml::from_str(&s).map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
