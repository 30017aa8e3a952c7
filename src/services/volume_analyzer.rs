use super::container_analyzer::PROTECTED_BY_LABEL;
use super::filters::too_recent;
use super::inspect::inspect_each;
use crate::domain::listing::VolumeDetail;
use crate::domain::resource::has_protect_label;
use crate::domain::{
    Category, ContainerRuntime, Labels, ResourceType, SweepConfig, VolumeResource,
    is_anonymous_volume,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct VolumeAnalyzer {
    runtime: Arc<dyn ContainerRuntime>,
}

impl VolumeAnalyzer {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    pub fn analyze(&self, config: &SweepConfig) -> Result<Vec<VolumeResource>> {
        self.analyze_at(config, Utc::now())
    }

    pub fn analyze_at(
        &self,
        config: &SweepConfig,
        now: DateTime<Utc>,
    ) -> Result<Vec<VolumeResource>> {
        let volumes: Vec<_> = self
            .runtime
            .list_volumes()
            .context("listing volumes")?
            .into_iter()
            .filter(|v| !config.anonymous || is_anonymous_volume(&v.name))
            .collect();

        let mounted = self.runtime.volumes_in_use().unwrap_or_else(|e| {
            warn!("Failed to read volumes in use, assuming none: {e:#}");
            HashSet::new()
        });

        // The listing carries neither labels nor creation time
        let names: Vec<String> = volumes
            .iter()
            .filter(|v| !v.name.is_empty())
            .map(|v| v.name.clone())
            .collect();
        let details = self.inspect(&names);

        let mut resources = Vec::with_capacity(volumes.len());
        for volume in volumes {
            let detail = details.get(&volume.name);
            let created_at = detail.and_then(|d| d.created_at);
            if too_recent(created_at, config.older_than, now) {
                debug!(name = %volume.name, "volume younger than threshold");
                continue;
            }

            let labels = detail.and_then(|d| d.labels.clone()).unwrap_or_default();
            let in_use = mounted.contains(&volume.name);
            let (category, reason) = categorize_volume(&volume.name, in_use, &labels);
            resources.push(VolumeResource::new(
                volume, category, in_use, labels, created_at, reason,
            ));
        }

        Ok(resources)
    }

    fn inspect(&self, names: &[String]) -> HashMap<String, VolumeDetail> {
        inspect_each(ResourceType::Volume, names, |names| self.runtime.inspect_volumes(names))
    }
}

pub fn categorize_volume(name: &str, in_use: bool, labels: &Labels) -> (Category, Option<String>) {
    if has_protect_label(labels) {
        (Category::Protected, Some(PROTECTED_BY_LABEL.into()))
    } else if in_use {
        (Category::Protected, Some("mounted by container".into()))
    } else if is_anonymous_volume(name) {
        (Category::Suggested, None)
    } else {
        (Category::Unused, None)
    }
}
