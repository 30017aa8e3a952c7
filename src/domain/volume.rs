use super::listing::VolumeSummary;
use super::resource::{Category, ComposeResource, Labels, Resource, ResourceType, truncate};
use chrono::{DateTime, Utc};

/// An analyzed volume, identified by name.
#[derive(Debug, Clone)]
pub struct VolumeResource {
    pub(crate) volume: VolumeSummary,
    pub(crate) category: Category,
    pub(crate) in_use: bool,
    pub(crate) labels: Labels,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) compose_project: Option<String>,
    pub(crate) protect_reason: Option<String>,
}

impl VolumeResource {
    pub fn new(
        volume: VolumeSummary,
        category: Category,
        in_use: bool,
        labels: Labels,
        created_at: Option<DateTime<Utc>>,
        protect_reason: Option<String>,
    ) -> Self {
        let compose_project = super::resource::compose_project_from_labels(&labels);
        Self {
            volume,
            category,
            in_use,
            labels,
            created_at,
            compose_project,
            protect_reason,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        is_anonymous_volume(&self.volume.name)
    }
}

/// Anonymous volumes are named with exactly 64 lowercase hex characters.
pub fn is_anonymous_volume(name: &str) -> bool {
    name.len() == 64 && name.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

impl Resource for VolumeResource {
    fn id(&self) -> &str {
        &self.volume.name
    }

    fn resource_type(&self) -> ResourceType {
        ResourceType::Volume
    }

    fn category(&self) -> Category {
        self.category
    }

    fn display_name(&self) -> String {
        truncate(&self.volume.name, 30)
    }

    fn details(&self) -> String {
        if self.in_use {
            "in use".into()
        } else if self.is_anonymous() {
            "anonymous".into()
        } else {
            "unused".into()
        }
    }

    // Volume size requires filesystem access on the runtime host
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

impl ComposeResource for VolumeResource {
    fn compose_project(&self) -> Option<&str> {
        self.compose_project.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_volume_shape() {
        let hex = "a".repeat(64);
        assert!(is_anonymous_volume(&hex));
        assert!(is_anonymous_volume(
            "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef"
        ));

        assert!(!is_anonymous_volume(&"a".repeat(63)));
        assert!(!is_anonymous_volume(&"a".repeat(65)));
        assert!(!is_anonymous_volume(&"A".repeat(64)));
        assert!(!is_anonymous_volume(&format!("{}g", "a".repeat(63))));
        assert!(!is_anonymous_volume("data-01"));
        assert!(!is_anonymous_volume(""));
    }
}
