use super::filters::too_recent;
use super::inspect::inspect_each;
use crate::domain::listing::ContainerDetail;
use crate::domain::resource::has_protect_label;
use crate::domain::{
    Category, ContainerResource, ContainerRuntime, Labels, ResourceType, SweepConfig,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub const PROTECTED_BY_LABEL: &str = "protected by label";

pub struct ContainerAnalyzer {
    runtime: Arc<dyn ContainerRuntime>,
}

impl ContainerAnalyzer {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    pub fn analyze(&self, config: &SweepConfig) -> Result<Vec<ContainerResource>> {
        self.analyze_at(config, Utc::now())
    }

    pub fn analyze_at(
        &self,
        config: &SweepConfig,
        now: DateTime<Utc>,
    ) -> Result<Vec<ContainerResource>> {
        let containers = self
            .runtime
            .list_containers()
            .context("listing containers")?;

        // Podman and old docker versions leave labels or timestamps out of `ps`
        let missing: Vec<String> = containers
            .iter()
            .filter(|c| c.labels.is_none() || c.created().is_none())
            .map(|c| c.id.clone())
            .collect();
        let details = self.inspect(&missing);

        let mut resources = Vec::with_capacity(containers.len());
        for container in containers {
            if config.exited && !container.state.eq_ignore_ascii_case("exited") {
                continue;
            }

            let detail = details.get(&container.id);
            let labels = container
                .labels
                .clone()
                .or_else(|| detail.map(ContainerDetail::labels))
                .unwrap_or_default();
            let created_at = container.created().or_else(|| detail.and_then(|d| d.created));

            if too_recent(created_at, config.older_than, now) {
                debug!(id = %container.id, "container younger than threshold");
                continue;
            }

            let (category, reason) = categorize_container(&container.state, &labels);
            resources.push(ContainerResource::new(
                container, category, labels, created_at, reason,
            ));
        }

        Ok(resources)
    }

    fn inspect(&self, ids: &[String]) -> HashMap<String, ContainerDetail> {
        inspect_each(ResourceType::Container, ids, |ids| self.runtime.inspect_containers(ids))
    }
}

/// Category of a container with the given state, plus the protection reason.
pub fn categorize_container(state: &str, labels: &Labels) -> (Category, Option<String>) {
    if has_protect_label(labels) {
        return (Category::Protected, Some(PROTECTED_BY_LABEL.into()));
    }

    match state.to_ascii_lowercase().as_str() {
        s @ ("running" | "paused" | "restarting") => (Category::Protected, Some(s.to_string())),
        "exited" | "dead" | "created" => (Category::Suggested, None),
        _ => (Category::Unused, None),
    }
}
