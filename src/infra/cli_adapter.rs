use super::removal;
use super::runtime_select::RuntimeKind;
use crate::domain::listing::{
    ContainerDetail, ContainerSummary, ImageDetail, ImageSummary, NetworkDetail, NetworkSummary,
    VolumeDetail, VolumeSummary, index_by, normalize_image_id,
};
use crate::domain::{ContainerRuntime, RemoveError, ResourceType};
use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::process::{Command, Output};
use tracing::{debug, warn};

/// Maximum number of IDs passed to a single inspect call.
pub const INSPECT_BATCH_SIZE: usize = 100;

/// Runtime gateway that shells out to the docker or podman CLI.
#[derive(Debug, Clone)]
pub struct CliRuntime {
    kind: RuntimeKind,
}

/// Everything containers reference, gathered from one listing + inspect pass.
#[derive(Debug, Default)]
struct ContainerReferences {
    images: HashSet<String>,
    volumes: HashSet<String>,
    networks: HashSet<String>,
}

impl CliRuntime {
    pub fn new(kind: RuntimeKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> RuntimeKind {
        self.kind
    }

    fn output<I, S>(&self, args: I) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args
            .into_iter()
            .map(|item| item.as_ref().to_os_string())
            .collect();
        debug!(runtime = %self.kind, ?args, "running runtime command");

        Command::new(self.kind.binary())
            .args(&args)
            .output()
            .with_context(|| format!("running {} {:?}", self.kind, args))
    }

    /// Runs a command and returns stdout, failing with stderr on a non-zero exit.
    fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args
            .into_iter()
            .map(|item| item.as_ref().to_string_lossy().into_owned())
            .collect();
        let output = self.output(&args)?;
        ensure_success(&output, self.kind, &args)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Runs an inspect command in batches and keeps every entry that parses.
    ///
    /// A failed batch is skipped; the call only fails when no batch succeeded.
    fn inspect_batched<T, F>(
        &self,
        prefix: &[&str],
        ids: &[String],
        key: F,
    ) -> Result<HashMap<String, T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> String,
    {
        let batches = ids
            .chunks(INSPECT_BATCH_SIZE)
            .map(|batch| self.inspect_batch(prefix, batch));
        merge_batches(batches, key)
    }

    /// `inspect` exits non-zero when any ID is missing but still prints the
    /// others, so stdout is used whenever it holds a JSON array.
    fn inspect_batch<T: DeserializeOwned>(
        &self,
        prefix: &[&str],
        batch: &[String],
    ) -> Result<Vec<T>> {
        let mut args: Vec<String> = prefix.iter().map(|s| s.to_string()).collect();
        args.extend(batch.iter().cloned());

        let output = self.output(&args)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            ensure_success(&output, self.kind, &args)?;
            return Ok(Vec::new());
        }
        if !output.status.success() {
            debug!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "inspect partially failed"
            );
        }

        parse_json_array(&stdout)
            .with_context(|| format!("parsing output of {} {}", self.kind, prefix.join(" ")))
    }

    fn container_references(&self) -> Result<ContainerReferences> {
        let containers = self.list_containers()?;
        let mut refs = ContainerReferences::default();

        for container in &containers {
            if !container.image.is_empty() {
                insert_image_reference(&mut refs.images, &container.image);
            }
        }

        let ids: Vec<String> = containers
            .iter()
            .filter(|c| !c.id.is_empty())
            .map(|c| c.id.clone())
            .collect();
        if ids.is_empty() {
            return Ok(refs);
        }

        let details = match self.inspect_containers(&ids) {
            Ok(details) => details,
            Err(e) => {
                // Keep what the listing already told us
                warn!("Failed to inspect containers: {e:#}");
                return Ok(refs);
            }
        };

        for detail in details.values() {
            let image_id = normalize_image_id(&detail.image);
            if !image_id.is_empty() {
                refs.images.insert(image_id.to_string());
            }
            refs.volumes.extend(
                detail
                    .mounts
                    .iter()
                    .filter(|m| m.kind == "volume" && !m.name.is_empty())
                    .map(|m| m.name.clone()),
            );
            refs.networks
                .extend(detail.network_settings.networks.iter().cloned());
        }

        Ok(refs)
    }
}

impl ContainerRuntime for CliRuntime {
    fn name(&self) -> &str {
        self.kind.binary()
    }

    fn check_available(&self) -> Result<()> {
        let output = self
            .output(["version"])
            .with_context(|| format!("{} is not available", self.kind))?;
        if !output.status.success() {
            bail!(
                "{} is not available: {}",
                self.kind,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }

    fn list_containers(&self) -> Result<Vec<ContainerSummary>> {
        let out = self.run(["ps", "-a", "--no-trunc", "--format", "{{json .}}"])?;
        parse_json_lines(&out).context("listing containers")
    }

    fn list_images(&self) -> Result<Vec<ImageSummary>> {
        let out = self.run(["images", "-a", "--no-trunc", "--format", "{{json .}}"])?;
        parse_json_lines(&out).context("listing images")
    }

    fn list_volumes(&self) -> Result<Vec<VolumeSummary>> {
        let out = self.run(["volume", "ls", "--format", "{{json .}}"])?;
        parse_json_lines(&out).context("listing volumes")
    }

    fn list_networks(&self) -> Result<Vec<NetworkSummary>> {
        let out = self.run(["network", "ls", "--no-trunc", "--format", "{{json .}}"])?;
        parse_json_lines(&out).context("listing networks")
    }

    fn inspect_containers(&self, ids: &[String]) -> Result<HashMap<String, ContainerDetail>> {
        self.inspect_batched(&["container", "inspect"], ids, |d: &ContainerDetail| {
            d.id.clone()
        })
    }

    fn inspect_images(&self, ids: &[String]) -> Result<HashMap<String, ImageDetail>> {
        self.inspect_batched(&["image", "inspect"], ids, |d: &ImageDetail| {
            normalize_image_id(&d.id).to_string()
        })
    }

    fn inspect_volumes(&self, names: &[String]) -> Result<HashMap<String, VolumeDetail>> {
        self.inspect_batched(&["volume", "inspect"], names, |d: &VolumeDetail| {
            d.name.clone()
        })
    }

    fn inspect_networks(&self, ids: &[String]) -> Result<HashMap<String, NetworkDetail>> {
        self.inspect_batched(&["network", "inspect"], ids, |d: &NetworkDetail| {
            if d.id.is_empty() {
                d.name.clone()
            } else {
                d.id.clone()
            }
        })
    }

    fn images_in_use(&self) -> Result<HashSet<String>> {
        Ok(self.container_references()?.images)
    }

    fn volumes_in_use(&self) -> Result<HashSet<String>> {
        Ok(self.container_references()?.volumes)
    }

    fn networks_in_use(&self) -> Result<HashSet<String>> {
        Ok(self.container_references()?.networks)
    }

    fn remove(&self, kind: ResourceType, id: &str) -> Result<(), RemoveError> {
        let args: &[&str] = match kind {
            ResourceType::Container => &["rm"],
            ResourceType::Image => &["rmi"],
            ResourceType::Volume => &["volume", "rm"],
            ResourceType::Network => &["network", "rm"],
        };
        let mut args: Vec<&str> = args.to_vec();
        args.push(id);

        let output = self
            .output(&args)
            .map_err(|e| RemoveError::Failed(format!("{e:#}")))?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(removal::classify(kind, &stderr))
    }
}

/// Records both the reference as written and its `:latest` form when untagged.
fn insert_image_reference(set: &mut HashSet<String>, reference: &str) {
    let reference = reference.trim();
    set.insert(reference.to_string());

    let name = reference.rsplit('/').next().unwrap_or(reference);
    if !name.contains(':') && !name.contains('@') {
        set.insert(format!("{reference}:latest"));
    }
}

/// Merges inspect batches keyed by `key`, skipping failed ones.
///
/// Returns the last error only when every batch failed.
fn merge_batches<T, F>(
    batches: impl IntoIterator<Item = Result<Vec<T>>>,
    key: F,
) -> Result<HashMap<String, T>>
where
    F: Fn(&T) -> String,
{
    let mut result = HashMap::new();
    let mut succeeded = false;
    let mut last_error = None;

    for batch in batches {
        match batch {
            Ok(entries) => {
                succeeded = true;
                result.extend(index_by(entries, &key));
            }
            Err(e) => {
                warn!("inspect batch failed, keeping the other batches: {e:#}");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if !succeeded => Err(e),
        _ => Ok(result),
    }
}

fn ensure_success(output: &Output, kind: RuntimeKind, args: &[String]) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }

    bail!(
        "{kind} {}: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr).trim()
    )
}

/// Parses one JSON document per line, skipping blank lines.
pub fn parse_json_lines<T: DeserializeOwned>(out: &str) -> Result<Vec<T>> {
    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str(line).with_context(|| format!("invalid JSON: {line}")))
        .collect()
}

/// Parses a JSON array, dropping entries that do not match `T`.
pub fn parse_json_array<T: DeserializeOwned>(out: &str) -> Result<Vec<T>> {
    let values: Vec<Value> = serde_json::from_str(out.trim())?;
    Ok(values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("skipping malformed entry: {e}");
                None
            }
        })
        .collect())
}
