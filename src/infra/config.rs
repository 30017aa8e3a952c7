use crate::domain::{ConfigError, SweepConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "config.toml";

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

pub fn default_config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".config/docker-sweep")
}

/// Expands `~` and environment variables in a user supplied directory.
pub fn expand_dir(raw: &Path) -> PathBuf {
    let raw = raw.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(raw.as_ref()),
    }
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct FiltersConfig {
    /// Default `--older-than`
    pub older_than: Option<String>,
    /// Default `--min-size`
    pub min_size: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `docker` or `podman`
    pub runtime: Option<String>,
    #[serde(default)]
    pub filters: FiltersConfig,
}

impl AppConfig {
    /// Values from `other` overwrite values in `self` if present.
    pub fn merge(&mut self, other: AppConfig) {
        if let Some(runtime) = other.runtime {
            self.runtime = Some(runtime);
        }
        if let Some(older_than) = other.filters.older_than {
            self.filters.older_than = Some(older_than);
        }
        if let Some(min_size) = other.filters.min_size {
            self.filters.min_size = Some(min_size);
        }
    }

    /// Fills filters of `config` that were not given on the command line.
    pub fn apply_defaults(&self, config: &mut SweepConfig, scope_has_images: bool) -> Result<()> {
        if config.older_than.is_none()
            && let Some(raw) = &self.filters.older_than
        {
            config.older_than = parse_duration(raw)?;
        }
        // A configured size only makes sense when images are part of the sweep
        if config.min_size.is_none()
            && scope_has_images
            && let Some(raw) = &self.filters.min_size
        {
            config.min_size = parse_size(raw)?;
        }
        Ok(())
    }
}

pub fn load_app_config(config_dir: &Path) -> Result<AppConfig> {
    let path = config_dir.join(CONFIG_FILE_NAME);
    let mut app_config = AppConfig::default();

    if !path.exists() {
        debug!(?path, "no config file");
        return Ok(app_config);
    }

    let content = fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
    let file_config: AppConfig =
        toml::from_str(&content).with_context(|| format!("parsing {:?}", path))?;
    app_config.merge(file_config);

    Ok(app_config)
}

/// Parses durations such as `90s`, `30m`, `24h`, `7d`, `2w`, `3M` or `1y`.
///
/// An empty string means "no filter". Months are 30 days, years 365 days.
pub fn parse_duration(raw: &str) -> Result<Option<Duration>, ConfigError> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }

    let invalid = || ConfigError::InvalidDuration(raw.to_string());

    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (number, unit) = value.split_at(split);
    let n: u64 = number.parse().map_err(|_| invalid())?;

    let unit_seconds = match unit {
        "s" => 1,
        "m" => MINUTE,
        "h" => HOUR,
        "d" => DAY,
        "w" => 7 * DAY,
        "M" => 30 * DAY,
        "y" => 365 * DAY,
        _ => return Err(invalid()),
    };

    n.checked_mul(unit_seconds)
        .map(|secs| Some(Duration::from_secs(secs)))
        .ok_or_else(invalid)
}

/// Parses sizes such as `100MB`, `1.5GB` or `512`; units are 1024-based.
pub fn parse_size(raw: &str) -> Result<Option<u64>, ConfigError> {
    let value = raw.trim().to_uppercase();
    if value.is_empty() {
        return Ok(None);
    }

    let invalid = || ConfigError::InvalidSize(raw.to_string());

    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let n: f64 = number.parse().map_err(|_| invalid())?;

    let multiplier: u64 = match unit.trim() {
        "" | "B" => 1,
        "KB" => 1024,
        "MB" => 1024 * 1024,
        "GB" => 1024 * 1024 * 1024,
        "TB" => 1024 * 1024 * 1024 * 1024,
        _ => return Err(invalid()),
    };

    Ok(Some((n * multiplier as f64) as u64))
}
