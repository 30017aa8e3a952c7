use super::listing::NetworkSummary;
use super::resource::{Category, ComposeResource, Labels, Resource, ResourceType, truncate};
use chrono::{DateTime, Utc};

/// Built-in networks that are never removed.
pub const SYSTEM_NETWORKS: [&str; 4] = ["bridge", "host", "none", "podman"];

pub fn is_system_network(name: &str) -> bool {
    SYSTEM_NETWORKS.contains(&name)
}

/// An analyzed network.
#[derive(Debug, Clone)]
pub struct NetworkResource {
    pub(crate) network: NetworkSummary,
    pub(crate) category: Category,
    pub(crate) in_use: bool,
    pub(crate) labels: Labels,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) compose_project: Option<String>,
    pub(crate) protect_reason: Option<String>,
}

impl NetworkResource {
    pub fn new(
        network: NetworkSummary,
        category: Category,
        in_use: bool,
        labels: Labels,
        created_at: Option<DateTime<Utc>>,
        protect_reason: Option<String>,
    ) -> Self {
        let compose_project = super::resource::compose_project_from_labels(&labels);
        Self {
            network,
            category,
            in_use,
            labels,
            created_at,
            compose_project,
            protect_reason,
        }
    }

    pub fn driver(&self) -> &str {
        &self.network.driver
    }
}

impl Resource for NetworkResource {
    fn id(&self) -> &str {
        &self.network.id
    }

    fn resource_type(&self) -> ResourceType {
        ResourceType::Network
    }

    fn category(&self) -> Category {
        self.category
    }

    fn display_name(&self) -> String {
        truncate(&self.network.name, 30)
    }

    fn details(&self) -> String {
        if is_system_network(&self.network.name) {
            "system".into()
        } else if self.in_use {
            "in use".into()
        } else {
            self.network.driver.clone()
        }
    }

    fn size(&self) -> u64 {
        0
    }

    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn protect_reason(&self) -> Option<&str> {
        self.protect_reason.as_deref()
    }

    fn as_compose(&self) -> Option<&dyn ComposeResource> {
        Some(self)
    }
}

impl ComposeResource for NetworkResource {
    fn compose_project(&self) -> Option<&str> {
        self.compose_project.as_deref()
    }
}
