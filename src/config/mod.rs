use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::tui::theme::ThemeConfig;

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "TASKBOARD_API_URL";

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

const DEFAULT_CONFIG: &str = r#"# taskboard configuration

# Base URL of the task API. Also used to resolve server-relative image paths.
# The TASKBOARD_API_URL environment variable and --api-url take precedence.
# api_url = "http://localhost:8080"

# How often the board polls for input, in milliseconds.
# tick_ms = 250

# [theme]
# todo = "cyan"
# in_progress = "yellow"
# done = "green"
# trash = "red"
# archive = "rgb(150,150,150)"
"#;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_tick_ms() -> u64 {
    250
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: None,
            tick_ms: default_tick_ms(),
            theme: ThemeConfig::default(),
        }
    }
}

impl Config {
    /// Pick the API base URL: explicit flag, then environment, then config
    /// file, then the built-in default.
    pub fn api_url(&self, flag: Option<&str>, env: Option<&str>) -> String {
        [flag, env, self.api_url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .to_string()
    }
}

/// Returns the base taskboard directory: ~/.taskboard/
pub fn base_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(".taskboard"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("config.toml"))
}

/// Returns the directory the board writes its log files to
pub fn log_dir() -> Result<PathBuf> {
    Ok(base_dir()?.join("logs"))
}

/// Ensure all required directories exist
pub fn ensure_dirs() -> Result<()> {
    fs::create_dir_all(base_dir()?).context("failed to create ~/.taskboard/")?;
    fs::create_dir_all(log_dir()?).context("failed to create ~/.taskboard/logs/")?;
    Ok(())
}

/// Create the config directory and a commented default config.toml.
/// Returns `false` if a config file was already there.
pub fn init() -> Result<bool> {
    ensure_dirs()?;
    let path = config_path()?;
    if path.exists() {
        return Ok(false);
    }
    fs::write(&path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

/// Load config from ~/.taskboard/config.toml (or return defaults if it doesn't exist)
pub fn load() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(Config::default());
    }
    let content =
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    parse(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}
