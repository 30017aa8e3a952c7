use super::listing::ContainerSummary;
use super::resource::{ComposeResource, Category, Labels, Resource, ResourceType, truncate};
use chrono::{DateTime, Utc};

/// An analyzed container.
#[derive(Debug, Clone)]
pub struct ContainerResource {
    pub(crate) container: ContainerSummary,
    pub(crate) category: Category,
    pub(crate) labels: Labels,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) compose_project: Option<String>,
    pub(crate) protect_reason: Option<String>,
}

impl ContainerResource {
    pub fn new(
        container: ContainerSummary,
        category: Category,
        labels: Labels,
        created_at: Option<DateTime<Utc>>,
        protect_reason: Option<String>,
    ) -> Self {
        let compose_project = super::resource::compose_project_from_labels(&labels);
        Self {
            container,
            category,
            labels,
            created_at,
            compose_project,
            protect_reason,
        }
    }

    pub fn state(&self) -> &str {
        &self.container.state
    }

    pub fn image(&self) -> &str {
        &self.container.image
    }
}

impl Resource for ContainerResource {
    fn id(&self) -> &str {
        &self.container.id
    }

    fn resource_type(&self) -> ResourceType {
        ResourceType::Container
    }

    fn category(&self) -> Category {
        self.category
    }

    fn display_name(&self) -> String {
        truncate(self.container.names.trim_start_matches('/'), 20)
    }

    fn details(&self) -> String {
        format!("{}  {}", self.container.state, truncate(&self.container.image, 25))
    }

    // Container size needs `ps --size`, which is too slow to run on every sweep
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

impl ComposeResource for ContainerResource {
    fn compose_project(&self) -> Option<&str> {
        self.compose_project.as_deref()
    }
}
