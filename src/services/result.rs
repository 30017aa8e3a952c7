use crate::domain::{
    ContainerResource, ImageResource, NetworkResource, Resource, ResourceType, VolumeResource,
};

/// Analyzed resources grouped by kind.
#[derive(Debug, Default)]
pub struct SweepResult {
    pub containers: Vec<ContainerResource>,
    pub images: Vec<ImageResource>,
    pub volumes: Vec<VolumeResource>,
    pub networks: Vec<NetworkResource>,
}

impl SweepResult {
    /// Every resource in kind order: containers, images, volumes, networks.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Resource> {
        let containers = self.containers.iter().map(|r| r as &dyn Resource);
        let images = self.images.iter().map(|r| r as &dyn Resource);
        let volumes = self.volumes.iter().map(|r| r as &dyn Resource);
        let networks = self.networks.iter().map(|r| r as &dyn Resource);
        containers.chain(images).chain(volumes).chain(networks)
    }

    pub fn of_kind(&self, kind: ResourceType) -> Vec<&dyn Resource> {
        self.iter().filter(|r| r.resource_type() == kind).collect()
    }

    /// Resources safe to delete by default.
    pub fn suggested(&self) -> Vec<&dyn Resource> {
        self.iter().filter(|r| r.is_suggested()).collect()
    }

    /// Every resource that is not protected.
    pub fn all(&self) -> Vec<&dyn Resource> {
        self.iter().filter(|r| !r.is_protected()).collect()
    }

    /// Reclaimable bytes of the suggested resources.
    pub fn total_size(&self) -> u64 {
        self.suggested().iter().map(|r| r.size()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
            && self.images.is_empty()
            && self.volumes.is_empty()
            && self.networks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Labels};
    use crate::test_support::{container, image, network, volume};

    fn sample() -> SweepResult {
        let none = Labels::new;
        SweepResult {
            containers: vec![
                ContainerResource::new(
                    container("c1", "web", "running"),
                    Category::Protected,
                    none(),
                    None,
                    Some("running".into()),
                ),
                ContainerResource::new(
                    container("c2", "job", "exited"),
                    Category::Suggested,
                    none(),
                    None,
                    None,
                ),
            ],
            images: vec![
                ImageResource::new(
                    image("i1", "<none>", "<none>", 300),
                    Category::Suggested,
                    false,
                    300,
                    none(),
                    None,
                    None,
                ),
                ImageResource::new(
                    image("i2", "app", "1", 700),
                    Category::Unused,
                    false,
                    700,
                    none(),
                    None,
                    None,
                ),
            ],
            volumes: vec![VolumeResource::new(
                volume("data-01"),
                Category::Unused,
                false,
                none(),
                None,
                None,
            )],
            networks: vec![NetworkResource::new(
                network("n1", "stale"),
                Category::Suggested,
                false,
                none(),
                None,
                None,
            )],
        }
    }

    fn ids(resources: &[&dyn Resource]) -> Vec<String> {
        resources.iter().map(|r| r.id().to_string()).collect()
    }

    #[test]
    fn suggested_in_kind_order() {
        assert_eq!(ids(&sample().suggested()), vec!["c2", "i1", "n1"]);
    }

    #[test]
    fn all_excludes_only_protected() {
        assert_eq!(ids(&sample().all()), vec!["c2", "i1", "i2", "data-01", "n1"]);
    }

    #[test]
    fn total_size_counts_suggested_only() {
        assert_eq!(sample().total_size(), 300);
    }

    #[test]
    fn emptiness() {
        assert!(SweepResult::default().is_empty());
        assert!(!sample().is_empty());

        let only_protected = SweepResult {
            containers: vec![ContainerResource::new(
                container("c1", "web", "running"),
                Category::Protected,
                Labels::new(),
                None,
                None,
            )],
            ..Default::default()
        };
        assert!(!only_protected.is_empty());
        assert!(only_protected.suggested().is_empty());
    }

    #[test]
    fn of_kind_filters() {
        assert_eq!(ids(&sample().of_kind(ResourceType::Image)), vec!["i1", "i2"]);
    }
}
