use super::container_analyzer::PROTECTED_BY_LABEL;
use super::filters::{too_recent, too_small};
use super::inspect::inspect_each;
use crate::domain::listing::{ImageDetail, ImageSummary, normalize_image_id};
use crate::domain::resource::has_protect_label;
use crate::domain::{Category, ContainerRuntime, ImageResource, Labels, ResourceType, SweepConfig};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ImageAnalyzer {
    runtime: Arc<dyn ContainerRuntime>,
}

impl ImageAnalyzer {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    pub fn analyze(&self, config: &SweepConfig) -> Result<Vec<ImageResource>> {
        self.analyze_at(config, Utc::now())
    }

    pub fn analyze_at(
        &self,
        config: &SweepConfig,
        now: DateTime<Utc>,
    ) -> Result<Vec<ImageResource>> {
        let images: Vec<ImageSummary> = self
            .runtime
            .list_images()
            .context("listing images")?
            .into_iter()
            .filter(|image| {
                let dangling = image.is_dangling();
                if config.dangling {
                    dangling
                } else if config.no_dangling {
                    !dangling
                } else {
                    true
                }
            })
            .collect();

        let in_use = self.runtime.images_in_use().unwrap_or_else(|e| {
            warn!("Failed to read images in use, assuming none: {e:#}");
            HashSet::new()
        });

        let details = self.inspect(&images, config);

        let mut resources = Vec::with_capacity(images.len());
        for image in images {
            let id = normalize_image_id(&image.id).to_string();
            let detail = details.get(&id);

            let size = image
                .size
                .filter(|s| *s > 0)
                .or_else(|| detail.and_then(|d| d.size))
                .unwrap_or(0);
            if too_small(size, config.min_size) {
                debug!(%id, size, "image below size threshold");
                continue;
            }

            let created_at = image.created().or_else(|| detail.and_then(|d| d.created));
            if too_recent(created_at, config.older_than, now) {
                debug!(%id, "image younger than threshold");
                continue;
            }

            let labels = image
                .labels
                .clone()
                .filter(|l| !l.is_empty())
                .or_else(|| detail.map(ImageDetail::labels))
                .unwrap_or_default();

            let used = is_image_in_use(&image, &in_use);
            let (category, reason) = categorize_image(used, image.is_dangling(), &labels);
            resources.push(ImageResource::new(
                image, category, used, size, labels, created_at, reason,
            ));
        }

        Ok(resources)
    }

    /// Inspects only the images whose listing lacks what the active filters need.
    fn inspect(&self, images: &[ImageSummary], config: &SweepConfig) -> HashMap<String, ImageDetail> {
        let mut seen = HashSet::new();
        let ids: Vec<String> = images
            .iter()
            .filter(|image| needs_inspect(image, config))
            .map(|image| normalize_image_id(&image.id).to_string())
            .filter(|id| !id.is_empty() && seen.insert(id.clone()))
            .collect();

        inspect_each(ResourceType::Image, &ids, |ids| self.runtime.inspect_images(ids))
    }
}

fn needs_inspect(image: &ImageSummary, config: &SweepConfig) -> bool {
    let size_unknown = config.min_size.is_some() && image.size.unwrap_or(0) == 0;
    let age_unknown = config.older_than.is_some() && image.created().is_none();
    let labels_unknown = image.labels.is_none();
    size_unknown || age_unknown || labels_unknown
}

/// Matches either the `repo:tag` reference or the normalized ID.
pub fn is_image_in_use(image: &ImageSummary, in_use: &HashSet<String>) -> bool {
    if !image.is_dangling() && in_use.contains(&image.reference()) {
        return true;
    }
    let id = normalize_image_id(&image.id);
    !id.is_empty() && in_use.contains(id)
}

pub fn categorize_image(in_use: bool, dangling: bool, labels: &Labels) -> (Category, Option<String>) {
    if has_protect_label(labels) {
        (Category::Protected, Some(PROTECTED_BY_LABEL.into()))
    } else if in_use {
        (Category::Protected, Some("in use by container".into()))
    } else if dangling {
        (Category::Suggested, None)
    } else {
        (Category::Unused, None)
    }
}
