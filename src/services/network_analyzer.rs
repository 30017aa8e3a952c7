use super::container_analyzer::PROTECTED_BY_LABEL;
use super::filters::too_recent;
use super::inspect::inspect_each;
use crate::domain::listing::{NetworkDetail, NetworkSummary};
use crate::domain::resource::has_protect_label;
use crate::domain::{
    Category, ContainerRuntime, Labels, NetworkResource, ResourceType, SweepConfig,
    is_system_network,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct NetworkAnalyzer {
    runtime: Arc<dyn ContainerRuntime>,
}

impl NetworkAnalyzer {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    pub fn analyze(&self, config: &SweepConfig) -> Result<Vec<NetworkResource>> {
        self.analyze_at(config, Utc::now())
    }

    pub fn analyze_at(
        &self,
        config: &SweepConfig,
        now: DateTime<Utc>,
    ) -> Result<Vec<NetworkResource>> {
        let networks = self
            .runtime
            .list_networks()
            .context("listing networks")?;

        let attached = self.runtime.networks_in_use().unwrap_or_else(|e| {
            warn!("Failed to read networks in use, assuming none: {e:#}");
            HashSet::new()
        });

        let keys: Vec<String> = networks.iter().map(inspect_key).collect();
        let details = self.inspect(&keys);

        let mut resources = Vec::with_capacity(networks.len());
        for network in networks {
            let detail = details
                .get(&network.id)
                .or_else(|| details.get(&network.name));

            let created_at = detail.and_then(|d| d.created);
            if too_recent(created_at, config.older_than, now) {
                debug!(name = %network.name, "network younger than threshold");
                continue;
            }

            let labels = detail.and_then(|d| d.labels.clone()).unwrap_or_default();
            let in_use = attached.contains(&network.name) || attached.contains(&network.id);
            let (category, reason) = categorize_network(&network.name, in_use, &labels);
            resources.push(NetworkResource::new(
                network, category, in_use, labels, created_at, reason,
            ));
        }

        Ok(resources)
    }

    fn inspect(&self, keys: &[String]) -> HashMap<String, NetworkDetail> {
        let keys: Vec<String> = keys.iter().filter(|k| !k.is_empty()).cloned().collect();
        inspect_each(ResourceType::Network, &keys, |keys| self.runtime.inspect_networks(keys))
    }
}

fn inspect_key(network: &NetworkSummary) -> String {
    if network.id.is_empty() {
        network.name.clone()
    } else {
        network.id.clone()
    }
}

pub fn categorize_network(name: &str, in_use: bool, labels: &Labels) -> (Category, Option<String>) {
    if has_protect_label(labels) {
        (Category::Protected, Some(PROTECTED_BY_LABEL.into()))
    } else if is_system_network(name) {
        (Category::Protected, Some("system network".into()))
    } else if in_use {
        (Category::Protected, Some("attached to container".into()))
    } else {
        (Category::Suggested, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LABEL_PROTECT, Resource, SYSTEM_NETWORKS};
    use crate::test_support::{MockRuntime, labels, network};
    use chrono::TimeZone;

    fn create_test_analyzer() -> (NetworkAnalyzer, Arc<MockRuntime>) {
        let mock = Arc::new(MockRuntime::new());
        (NetworkAnalyzer::new(mock.clone()), mock)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_system_networks_are_protected() {
        for name in SYSTEM_NETWORKS {
            let (category, reason) = categorize_network(name, false, &Labels::new());
            assert_eq!(category, Category::Protected, "{name}");
            assert_eq!(reason.as_deref(), Some("system network"));
        }
    }

    #[test]
    fn test_custom_networks() {
        let (analyzer, mock) = create_test_analyzer();
        mock.add_network(network("n1", "bridge"));
        mock.add_network(network("n2", "frontend"));
        mock.add_network(network("n3", "stale"));
        mock.mark_network_in_use("frontend");

        let result = analyzer.analyze_at(&SweepConfig::default(), now()).unwrap();

        assert!(result[0].is_protected());
        assert_eq!(result[0].details(), "system");
        assert!(result[1].is_protected());
        assert_eq!(result[1].details(), "in use");
        assert!(result[2].is_suggested());
        assert_eq!(result[2].details(), "bridge");
    }

    #[test]
    fn test_detail_lookup_falls_back_to_name() {
        let (analyzer, mock) = create_test_analyzer();
        mock.add_network(network("", "guarded"));
        mock.set_network_detail(NetworkDetail {
            id: "guarded".into(),
            name: "guarded".into(),
            labels: Some(labels(&[(LABEL_PROTECT, "true")])),
            ..Default::default()
        });

        let result = analyzer.analyze_at(&SweepConfig::default(), now()).unwrap();
        assert!(result[0].is_protected());
        assert_eq!(result[0].protect_reason(), Some(PROTECTED_BY_LABEL));
    }

    #[test]
    fn test_age_filter_drops_new_networks() {
        let (analyzer, mock) = create_test_analyzer();
        mock.add_network(network("n1", "fresh"));
        mock.set_network_detail(NetworkDetail {
            id: "n1".into(),
            name: "fresh".into(),
            created: Some(now() - chrono::Duration::minutes(1)),
            ..Default::default()
        });

        let config = SweepConfig {
            older_than: Some(std::time::Duration::from_secs(86_400)),
            ..Default::default()
        };
        assert!(analyzer.analyze_at(&config, now()).unwrap().is_empty());
    }
}
