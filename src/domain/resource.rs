use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::{self, Debug};

/// Label that protects any resource from deletion when set to `true`.
pub const LABEL_PROTECT: &str = "sweep.protect";
/// Docker Compose project name label.
pub const LABEL_COMPOSE_PROJECT: &str = "com.docker.compose.project";
/// Podman Compose project name label.
pub const LABEL_PODMAN_PROJECT: &str = "io.podman.compose.project";

pub type Labels = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    Container,
    Image,
    Volume,
    Network,
}

impl ResourceType {
    /// Kind order used by every aggregate view.
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Container,
        ResourceType::Image,
        ResourceType::Volume,
        ResourceType::Network,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Image => "image",
            Self::Volume => "volume",
            Self::Network => "network",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a resource is (or is not) offered for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Never deleted: running, in use, system or labeled.
    Protected,
    /// In use but removable. Part of the taxonomy, not assigned by any analyzer yet.
    InUse,
    /// Safe default for deletion.
    Suggested,
    /// Not in use, but the operator has to opt in.
    Unused,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Protected => "protected",
            Self::InUse => "in_use",
            Self::Suggested => "suggested",
            Self::Unused => "unused",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability set shared by every analyzed resource.
///
/// Protection and suggestion are derived from the category fixed at analysis
/// time; implementors only provide `category`.
pub trait Resource: Debug + Send + Sync {
    fn id(&self) -> &str;

    fn resource_type(&self) -> ResourceType;

    fn category(&self) -> Category;

    /// Name shortened for list output.
    fn display_name(&self) -> String;

    /// Short status string.
    fn details(&self) -> String;

    /// Size in bytes, 0 when unknown.
    fn size(&self) -> u64;

    fn labels(&self) -> &Labels;

    fn created_at(&self) -> Option<DateTime<Utc>>;

    /// Diagnostic reason, only set for protected resources.
    fn protect_reason(&self) -> Option<&str>;

    fn is_protected(&self) -> bool {
        self.category() == Category::Protected
    }

    fn is_suggested(&self) -> bool {
        self.category() == Category::Suggested
    }

    /// Compose capability, only available on kinds that can belong to a stack.
    fn as_compose(&self) -> Option<&dyn ComposeResource> {
        None
    }
}

/// Resources that can belong to a compose project (containers, volumes, networks).
pub trait ComposeResource: Resource {
    fn compose_project(&self) -> Option<&str>;
}

/// Compose project of any resource, `None` for images or unlabeled resources.
pub fn compose_project(resource: &dyn Resource) -> Option<&str> {
    resource.as_compose().and_then(|r| r.compose_project())
}

/// Reads the compose project from labels, docker label first.
pub fn compose_project_from_labels(labels: &Labels) -> Option<String> {
    [LABEL_COMPOSE_PROJECT, LABEL_PODMAN_PROJECT]
        .iter()
        .filter_map(|key| labels.get(*key))
        .find(|value| !value.is_empty())
        .cloned()
}

pub fn has_protect_label(labels: &Labels) -> bool {
    labels.get(LABEL_PROTECT).is_some_and(|v| v == "true")
}

/// Truncates to `max` characters, ending with `...` when shortened.
pub(crate) fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let kept: String = value.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
