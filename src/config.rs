//! Optional config file loading. Search order: ./novelfetch.toml, then
//! $XDG_CONFIG_HOME/novelfetch/config.toml (or ~/.config/novelfetch/config.toml).

use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Config file contents. All fields optional; only present keys override defaults.
///
/// The delay between requests is fixed and deliberately absent here.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Base directory under which `<work_id>/` is created. Relative to CWD.
    pub output_dir: Option<PathBuf>,
    /// HTTP User-Agent header, replacing the built-in descriptive one.
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Extra Shift_JIS substitutions: single character -> raw bytes, e.g. `"😀" = [0x81, 0x48]`.
    pub legacy_fallback: Option<HashMap<String, Vec<u8>>>,
}

/// Search order: (1) ./novelfetch.toml, (2) $XDG_CONFIG_HOME/novelfetch/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> anyhow::Result<Option<Config>> {
    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    let mut paths = vec![cwd.join("novelfetch.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("novelfetch").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read config {}", path.display()))?;
            let config: Config = toml::from_str(&s)
                .with_context(|| format!("Invalid config {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            return Ok(Some(config));
        }
    }
    Ok(None)
}
