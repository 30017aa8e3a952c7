//! Raw records returned by the container runtime.
//!
//! Docker and Podman disagree on field casing and on value shapes (labels as a
//! map or as a `k=v,k=v` string, names as a string or an array, timestamps as
//! unix seconds or formatted strings). Every record here accepts both.

use super::resource::Labels;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

/// Placeholder used by runtimes for an unset repository or tag.
pub const NONE_TAG: &str = "<none>";

/// One entry of `ps -a`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerSummary {
    #[serde(rename = "ID", alias = "Id", alias = "id", default)]
    pub id: String,
    #[serde(rename = "Names", alias = "names", default, deserialize_with = "names")]
    pub names: String,
    #[serde(rename = "Image", alias = "image", default, deserialize_with = "text")]
    pub image: String,
    #[serde(rename = "State", alias = "state", default, deserialize_with = "text")]
    pub state: String,
    #[serde(rename = "Status", alias = "status", default, deserialize_with = "text")]
    pub status: String,
    #[serde(rename = "CreatedAt", alias = "createdAt", default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "Created", alias = "created", default, deserialize_with = "timestamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(rename = "Labels", alias = "labels", default, deserialize_with = "labels")]
    pub labels: Option<Labels>,
}

impl ContainerSummary {
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at.or(self.created)
    }
}

/// One entry of `images -a`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageSummary {
    #[serde(rename = "ID", alias = "Id", alias = "id", default)]
    pub id: String,
    #[serde(rename = "Repository", alias = "repository", default, deserialize_with = "text")]
    pub repository: String,
    #[serde(rename = "Tag", alias = "tag", default, deserialize_with = "text")]
    pub tag: String,
    /// `None` when the listing carries no size column.
    #[serde(rename = "Size", alias = "size", default, deserialize_with = "size")]
    pub size: Option<u64>,
    #[serde(rename = "CreatedAt", alias = "createdAt", default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "Created", alias = "created", default, deserialize_with = "timestamp")]
    pub created: Option<DateTime<Utc>>,
    /// `None` when the listing carries no labels column at all.
    #[serde(rename = "Labels", alias = "labels", default, deserialize_with = "labels")]
    pub labels: Option<Labels>,
}

impl ImageSummary {
    pub fn repository(&self) -> &str {
        if self.repository.is_empty() {
            NONE_TAG
        } else {
            &self.repository
        }
    }

    pub fn tag(&self) -> &str {
        if self.tag.is_empty() { NONE_TAG } else { &self.tag }
    }

    /// Neither repository nor tag is set.
    pub fn is_dangling(&self) -> bool {
        self.repository() == NONE_TAG && self.tag() == NONE_TAG
    }

    pub fn reference(&self) -> String {
        format!("{}:{}", self.repository(), self.tag())
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created.or(self.created_at)
    }
}

/// One entry of `volume ls`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolumeSummary {
    #[serde(rename = "Name", alias = "name", default, deserialize_with = "text")]
    pub name: String,
    #[serde(rename = "Driver", alias = "driver", default, deserialize_with = "text")]
    pub driver: String,
    #[serde(rename = "Mountpoint", alias = "mountpoint", default, deserialize_with = "text")]
    pub mountpoint: String,
}

/// One entry of `network ls`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkSummary {
    #[serde(rename = "ID", alias = "Id", alias = "id", default)]
    pub id: String,
    #[serde(rename = "Name", alias = "name", default, deserialize_with = "text")]
    pub name: String,
    #[serde(rename = "Driver", alias = "driver", default, deserialize_with = "text")]
    pub driver: String,
    #[serde(rename = "Scope", alias = "scope", default, deserialize_with = "text")]
    pub scope: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerMount {
    #[serde(rename = "Type", alias = "type", default, deserialize_with = "text")]
    pub kind: String,
    #[serde(rename = "Name", alias = "name", default, deserialize_with = "text")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerConfig {
    #[serde(rename = "Labels", alias = "labels", default, deserialize_with = "labels")]
    pub labels: Option<Labels>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkSettings {
    #[serde(rename = "Networks", alias = "networks", default, deserialize_with = "keys")]
    pub networks: Vec<String>,
}

/// Result of `container inspect`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerDetail {
    #[serde(rename = "Id", alias = "ID", alias = "id", default)]
    pub id: String,
    #[serde(rename = "Created", alias = "created", default, deserialize_with = "timestamp")]
    pub created: Option<DateTime<Utc>>,
    /// Image ID the container was created from.
    #[serde(rename = "Image", alias = "image", default, deserialize_with = "text")]
    pub image: String,
    #[serde(rename = "Config", alias = "config", default)]
    pub config: ContainerConfig,
    #[serde(rename = "Mounts", alias = "mounts", default, deserialize_with = "null_default")]
    pub mounts: Vec<ContainerMount>,
    #[serde(rename = "NetworkSettings", alias = "networkSettings", default)]
    pub network_settings: NetworkSettings,
}

impl ContainerDetail {
    pub fn labels(&self) -> Labels {
        self.config.labels.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageConfig {
    #[serde(rename = "Labels", alias = "labels", default, deserialize_with = "labels")]
    pub labels: Option<Labels>,
}

/// Result of `image inspect`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageDetail {
    #[serde(rename = "Id", alias = "ID", alias = "id", default)]
    pub id: String,
    #[serde(rename = "Size", alias = "size", default, deserialize_with = "size")]
    pub size: Option<u64>,
    #[serde(rename = "Created", alias = "created", default, deserialize_with = "timestamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(rename = "Labels", alias = "labels", default, deserialize_with = "labels")]
    pub labels: Option<Labels>,
    #[serde(rename = "Config", alias = "config", default)]
    pub config: ImageConfig,
}

impl ImageDetail {
    /// Labels live at the top level or under `Config` depending on the runtime version.
    pub fn labels(&self) -> Labels {
        self.labels
            .clone()
            .or_else(|| self.config.labels.clone())
            .unwrap_or_default()
    }
}

/// Result of `volume inspect`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolumeDetail {
    #[serde(rename = "Name", alias = "name", default, deserialize_with = "text")]
    pub name: String,
    #[serde(rename = "CreatedAt", alias = "createdAt", default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "Labels", alias = "labels", default, deserialize_with = "labels")]
    pub labels: Option<Labels>,
}

/// Result of `network inspect`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkDetail {
    #[serde(rename = "Id", alias = "ID", alias = "id", default)]
    pub id: String,
    #[serde(rename = "Name", alias = "name", default, deserialize_with = "text")]
    pub name: String,
    #[serde(rename = "Created", alias = "created", default, deserialize_with = "timestamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(rename = "Driver", alias = "driver", default, deserialize_with = "text")]
    pub driver: String,
    #[serde(rename = "Labels", alias = "labels", default, deserialize_with = "labels")]
    pub labels: Option<Labels>,
}

/// Strips the digest algorithm prefix from an image ID.
pub fn normalize_image_id(id: &str) -> &str {
    let id = id.trim();
    id.strip_prefix("sha256:").unwrap_or(id)
}

/// Parses a `k=v,k=v` label string.
pub fn parse_label_string(raw: &str) -> Labels {
    raw.split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Parses sizes such as `1.2GB`, `512 MB` or `42`, 1024-based.
pub fn parse_human_size(raw: &str) -> Option<u64> {
    let cleaned = raw.trim().to_uppercase().replace(' ', "");
    if cleaned.is_empty() {
        return None;
    }

    const UNITS: [(&str, f64); 5] = [
        ("TB", 1024.0 * 1024.0 * 1024.0 * 1024.0),
        ("GB", 1024.0 * 1024.0 * 1024.0),
        ("MB", 1024.0 * 1024.0),
        ("KB", 1024.0),
        ("B", 1.0),
    ];

    for (suffix, multiplier) in UNITS {
        if let Some(number) = cleaned.strip_suffix(suffix) {
            let value: f64 = number.parse().ok()?;
            return Some((value * multiplier) as u64);
        }
    }

    cleaned.parse::<f64>().ok().map(|value| value as u64)
}

/// Parses the timestamp formats emitted by docker and podman.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    // "2024-01-02 15:04:05 +0000 UTC" (docker ps) and "... +0000"
    let without_zone_name = match raw.rsplit_once(' ') {
        Some((head, tail)) if tail.chars().all(|c| c.is_ascii_alphabetic()) => head,
        _ => raw,
    };
    for layout in ["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%d %H:%M:%S %z"] {
        if let Ok(parsed) = DateTime::parse_from_str(without_zone_name, layout) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    raw.parse::<i64>().ok().and_then(from_unix)
}

fn from_unix(seconds: i64) -> Option<DateTime<Utc>> {
    // Zero means "unknown" for both runtimes
    if seconds <= 0 {
        return None;
    }
    Utc.timestamp_opt(seconds, 0).single()
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn names<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .into_iter()
            .find_map(|item| item.as_str().map(|s| s.trim().to_string()))
            .unwrap_or_default(),
        _ => String::new(),
    })
}

fn labels<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Labels>, D::Error> {
    let labels = match Value::deserialize(deserializer)? {
        Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, value)
            })
            .collect(),
        Value::String(s) => parse_label_string(&s),
        _ => Labels::new(),
    };
    Ok(Some(labels))
}

fn size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => parse_human_size(&s),
        _ => None,
    })
}

fn timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(from_unix),
        Value::String(s) => parse_timestamp(&s),
        _ => None,
    })
}

fn keys<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map.into_iter().map(|(k, _)| k).collect(),
        _ => Vec::new(),
    })
}

fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Indexes records by key, skipping entries without one.
pub fn index_by<T>(records: Vec<T>, key: impl Fn(&T) -> String) -> HashMap<String, T> {
    records
        .into_iter()
        .filter_map(|record| {
            let k = key(&record);
            (!k.is_empty()).then_some((k, record))
        })
        .collect()
}
