use crate::domain::{ContainerRuntime, RemoveError, Resource, ResourceType};
use std::fmt;
use std::sync::Arc;

/// Image removal passes before blocked images are reported.
pub const MAX_IMAGE_PASSES: usize = 3;

/// Kinds deleted one after another, images excluded. Containers go first since
/// they hold references to everything else.
const PHASES: [ResourceType; 3] = [
    ResourceType::Container,
    ResourceType::Network,
    ResourceType::Volume,
];

/// A resource that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionError {
    pub resource_type: ResourceType,
    pub name: String,
    pub message: String,
}

impl fmt::Display for DeletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    /// Removed resources, including those already gone
    pub deleted: usize,
    pub errors: Vec<DeletionError>,
}

impl DeletionReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    fn record(&mut self, resource: &dyn Resource, message: impl Into<String>) {
        self.errors.push(DeletionError {
            resource_type: resource.resource_type(),
            name: resource.display_name(),
            message: message.into(),
        });
    }
}

/// Removes selected resources in dependency-safe order.
///
/// Every resource is attempted, failures are collected into the report. Nothing
/// is logged here; callers decide how to render the outcome.
pub struct DeletionOrchestrator {
    runtime: Arc<dyn ContainerRuntime>,
}

impl DeletionOrchestrator {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    pub fn delete(&self, resources: &[&dyn Resource]) -> DeletionReport {
        let mut report = DeletionReport::default();

        for kind in PHASES {
            for resource in resources.iter().filter(|r| r.resource_type() == kind) {
                match self.runtime.remove(kind, resource.id()) {
                    Ok(()) | Err(RemoveError::AlreadyRemoved(_)) => report.deleted += 1,
                    Err(e) => report.record(*resource, e.to_string()),
                }
            }
        }

        let images: Vec<&dyn Resource> = resources
            .iter()
            .copied()
            .filter(|r| r.resource_type() == ResourceType::Image)
            .collect();
        self.delete_images(images, &mut report);

        report
    }

    /// Deletes images in passes, deferring the ones blocked by child images.
    fn delete_images(&self, mut pending: Vec<&dyn Resource>, report: &mut DeletionReport) {
        for _ in 0..MAX_IMAGE_PASSES {
            if pending.is_empty() {
                return;
            }

            let mut deferred = Vec::new();
            for image in pending {
                match self.runtime.remove(ResourceType::Image, image.id()) {
                    Ok(()) | Err(RemoveError::AlreadyRemoved(_)) => report.deleted += 1,
                    Err(RemoveError::Dependency(_)) => deferred.push(image),
                    Err(RemoveError::Failed(message)) => report.record(image, message),
                }
            }
            pending = deferred;
        }

        for image in pending {
            report.record(image, "has dependent images (not deleted)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Category, ContainerResource, ImageResource, Labels, NetworkResource, VolumeResource,
    };
    use crate::test_support::{MockRuntime, container, image, network, volume};

    const DEPENDENT: &str = "Error response from daemon: conflict: unable to delete abc \
        (cannot be forced) - image has dependent child images";

    fn create_test_orchestrator() -> (DeletionOrchestrator, Arc<MockRuntime>) {
        let mock = Arc::new(MockRuntime::new());
        (DeletionOrchestrator::new(mock.clone()), mock)
    }

    fn image_resource(id: &str, repository: &str) -> ImageResource {
        ImageResource::new(
            image(id, repository, "latest", 1024),
            Category::Unused,
            false,
            1024,
            Labels::new(),
            None,
            None,
        )
    }

    fn container_resource(id: &str) -> ContainerResource {
        ContainerResource::new(
            container(id, id, "exited"),
            Category::Suggested,
            Labels::new(),
            None,
            None,
        )
    }

    #[test]
    fn test_delete_with_empty_selection() {
        let (orchestrator, mock) = create_test_orchestrator();

        let report = orchestrator.delete(&[]);

        assert_eq!(report, DeletionReport::default());
        assert!(mock.get_commands().is_empty());
    }

    #[test]
    fn test_delete_orders_kinds() {
        let (orchestrator, mock) = create_test_orchestrator();
        let img = image_resource("i1", "app");
        let vol = VolumeResource::new(
            volume("data"),
            Category::Unused,
            false,
            Labels::new(),
            None,
            None,
        );
        let net = NetworkResource::new(
            network("n1", "web"),
            Category::Suggested,
            false,
            Labels::new(),
            None,
            None,
        );
        let ctr = container_resource("c1");

        let report = orchestrator.delete(&[&img, &vol, &net, &ctr]);

        assert_eq!(report.deleted, 4);
        assert_eq!(
            mock.removal_calls(),
            vec!["container:c1", "network:n1", "volume:data", "image:i1"]
        );
    }

    #[test]
    fn test_delete_continues_on_failure() {
        let (orchestrator, mock) = create_test_orchestrator();
        let c1 = container_resource("c1");
        let c2 = container_resource("c2");
        mock.fail_removal_always("c1", "Error response from daemon: permission denied");

        let report = orchestrator.delete(&[&c1, &c2]);

        assert_eq!(report.deleted, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].to_string(),
            "c1: Error response from daemon: permission denied"
        );
        assert_eq!(mock.removal_calls(), vec!["container:c1", "container:c2"]);
    }

    #[test]
    fn test_already_removed_counts_as_deleted() {
        let (orchestrator, mock) = create_test_orchestrator();
        let c1 = container_resource("c1");
        mock.fail_removal_always("c1", "Error response from daemon: No such container: c1");

        let report = orchestrator.delete(&[&c1]);

        assert_eq!(report.deleted, 1);
        assert!(report.is_success());
    }

    #[test]
    fn test_dependent_image_is_retried() {
        let (orchestrator, mock) = create_test_orchestrator();
        let parent = image_resource("parent", "base");
        let child = image_resource("child", "app");
        mock.fail_removal_times("parent", &[DEPENDENT]);

        let report = orchestrator.delete(&[&parent, &child]);

        assert_eq!(report.deleted, 2);
        assert!(report.is_success());
        assert_eq!(
            mock.removal_calls(),
            vec!["image:parent", "image:child", "image:parent"]
        );
    }

    #[test]
    fn test_image_failure_is_not_retried() {
        let (orchestrator, mock) = create_test_orchestrator();
        let img = image_resource("i1", "app");
        mock.fail_removal_always("i1", "Error: image is locked");

        let report = orchestrator.delete(&[&img]);

        assert_eq!(report.deleted, 0);
        assert_eq!(report.errors[0].message, "Error: image is locked");
        assert_eq!(report.errors[0].resource_type, ResourceType::Image);
        assert_eq!(mock.removal_calls().len(), 1);
    }

    #[test]
    fn test_retries_are_bounded() {
        let (orchestrator, mock) = create_test_orchestrator();
        let img = image_resource("i1", "stuck");
        mock.fail_removal_always("i1", DEPENDENT);

        let report = orchestrator.delete(&[&img]);

        assert_eq!(report.deleted, 0);
        assert_eq!(
            report.errors[0].to_string(),
            "stuck:latest: has dependent images (not deleted)"
        );
        assert_eq!(mock.removal_calls().len(), MAX_IMAGE_PASSES);
    }
}
