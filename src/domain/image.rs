use super::listing::{ImageSummary, NONE_TAG, normalize_image_id};
use super::resource::{Category, Labels, Resource, ResourceType, truncate};
use chrono::{DateTime, Utc};

/// An analyzed image. Images never belong to a compose project.
#[derive(Debug, Clone)]
pub struct ImageResource {
    pub(crate) image: ImageSummary,
    pub(crate) category: Category,
    pub(crate) in_use: bool,
    pub(crate) size: u64,
    pub(crate) labels: Labels,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) protect_reason: Option<String>,
}

impl ImageResource {
    pub fn new(
        image: ImageSummary,
        category: Category,
        in_use: bool,
        size: u64,
        labels: Labels,
        created_at: Option<DateTime<Utc>>,
        protect_reason: Option<String>,
    ) -> Self {
        Self {
            image,
            category,
            in_use,
            size,
            labels,
            created_at,
            protect_reason,
        }
    }

    pub fn is_dangling(&self) -> bool {
        self.image.is_dangling()
    }

    pub fn in_use(&self) -> bool {
        self.in_use
    }
}

/// First 12 characters of an image ID, without the digest prefix.
pub fn short_image_id(id: &str) -> String {
    normalize_image_id(id).chars().take(12).collect()
}

impl Resource for ImageResource {
    fn id(&self) -> &str {
        &self.image.id
    }

    fn resource_type(&self) -> ResourceType {
        ResourceType::Image
    }

    fn category(&self) -> Category {
        self.category
    }

    fn display_name(&self) -> String {
        if self.image.repository() == NONE_TAG {
            return format!("{NONE_TAG}:{}", short_image_id(&self.image.id));
        }

        let mut name = self.image.repository().to_string();
        if self.image.tag() != NONE_TAG {
            name.push(':');
            name.push_str(self.image.tag());
        }
        truncate(&name, 30)
    }

    fn details(&self) -> String {
        if self.in_use {
            "in use".into()
        } else if self.image.repository() == NONE_TAG {
            "dangling".into()
        } else {
            "unused".into()
        }
    }

    fn size(&self) -> u64 {
        self.size
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
}
