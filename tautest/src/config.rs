use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tautest_core::http::{HttpHeader, HttpSettings};

use crate::cli::Cli;

const DEFAULT_TAUTEST_TOML: &str = include_str!("default_tautest.toml");
const CONFIG_FILE_NAME: &str = "tautest.toml";

/// Contents of a tautest.toml file.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TautestConfig {
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub transport: TransportSettings,
    /// Headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TransportSettings {
    pub timeout_ms: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self { timeout_ms: 30_000 }
    }
}

pub fn default_tautest_toml() -> &'static str {
    DEFAULT_TAUTEST_TOML
}

pub fn load_config(explicit: Option<&Path>) -> Result<TautestConfig, String> {
    let cwd = std::env::current_dir().map_err(|error| format!("failed to read cwd: {error}"))?;
    load_config_from(explicit, &cwd, home_config_path().as_deref())
}

pub(crate) fn load_config_from(
    explicit: Option<&Path>,
    start_dir: &Path,
    home_config: Option<&Path>,
) -> Result<TautestConfig, String> {
    if let Some(path) = explicit {
        return load_config_from_path(path);
    }
    if let Some(path) = find_project_config(start_dir) {
        log::debug!("using config {}", path.display());
        return load_config_from_path(&path);
    }
    if let Some(path) = home_config.filter(|path| path.is_file()) {
        log::debug!("using config {}", path.display());
        return load_config_from_path(path);
    }
    parse_config(DEFAULT_TAUTEST_TOML)
}

fn load_config_from_path(path: &Path) -> Result<TautestConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|error| format!("failed to read config '{}': {error}", path.display()))?;
    parse_config(&contents).map_err(|error| format!("invalid config '{}': {error}", path.display()))
}

fn parse_config(contents: &str) -> Result<TautestConfig, String> {
    toml::from_str(contents).map_err(|error| format!("{error}"))
}

/// Nearest tautest.toml from `start_dir` upwards, stopping at the repository root.
fn find_project_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = Some(start_dir);
    while let Some(dir) = current {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if dir.join(".git").exists() {
            break;
        }
        current = dir.parent();
    }
    None
}

fn home_config_path() -> Option<PathBuf> {
    home_config_path_from(std::env::var_os("HOME"))
}

fn home_config_path_from(home: Option<std::ffi::OsString>) -> Option<PathBuf> {
    let home = home?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("tautest")
            .join(CONFIG_FILE_NAME),
    )
}

/// Applies command-line overrides on top of file settings.
pub fn apply_overrides(mut settings: HttpSettings, cli: &Cli) -> HttpSettings {
    if let Some(base_url) = &cli.base_url {
        settings.base_url = Some(base_url.clone());
    }
    if cli.no_follow_redirects {
        settings.follow_redirects = false;
    }
    if let Some(max_redirects) = cli.max_redirects {
        settings.max_redirects = max_redirects;
    }
    if let Some(verbosity) = cli.verbosity {
        settings.verbosity = verbosity;
    }
    settings
}

/// Config-file headers first, then `--header` entries, which win on conflict.
pub fn build_header(
    configured: &BTreeMap<String, String>,
    entries: &[String],
) -> Result<HttpHeader, String> {
    let mut header = HttpHeader::new();
    for (name, value) in configured {
        header.set(name.clone(), value.clone());
    }
    for entry in entries {
        let (name, value) = parse_header(entry)?;
        header.set(name, value);
    }
    Ok(header)
}

pub fn parse_header(entry: &str) -> Result<(String, String), String> {
    let (name, value) = entry
        .split_once(':')
        .ok_or_else(|| format!("invalid header entry: '{entry}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid header entry: '{entry}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Parses inline JSON, or reads it from a file when prefixed with `@`.
pub fn parse_json_arg(flag: &str, raw: &str) -> Result<serde_json::Value, String> {
    let payload = if let Some(path) = raw.strip_prefix('@') {
        fs::read_to_string(path).map_err(|error| format!("failed to read {flag}: {error}"))?
    } else {
        raw.to_string()
    };
    serde_json::from_str(&payload).map_err(|error| format!("invalid {flag}: {error}"))
}
