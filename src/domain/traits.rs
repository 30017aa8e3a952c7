use super::listing::{
    ContainerDetail, ContainerSummary, ImageDetail, ImageSummary, NetworkDetail, NetworkSummary,
    VolumeDetail, VolumeSummary,
};
use super::resource::ResourceType;
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use thiserror::Error;

/// Classified failure of a removal call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoveError {
    /// The resource no longer exists; callers count this as removed.
    #[error("already removed: {0}")]
    AlreadyRemoved(String),
    /// Another image still depends on this one.
    #[error("{0}")]
    Dependency(String),
    #[error("{0}")]
    Failed(String),
}

/// Query and removal operations of a container runtime.
///
/// Listings are fatal when they fail. Inspect calls return whatever entries
/// could be read; a missing key means "no detail available".
pub trait ContainerRuntime: Send + Sync + Debug {
    /// Name of the runtime binary (`docker`, `podman`)
    fn name(&self) -> &str;

    /// Fails when the runtime cannot be reached
    fn check_available(&self) -> Result<()>;

    fn list_containers(&self) -> Result<Vec<ContainerSummary>>;

    fn list_images(&self) -> Result<Vec<ImageSummary>>;

    fn list_volumes(&self) -> Result<Vec<VolumeSummary>>;

    fn list_networks(&self) -> Result<Vec<NetworkSummary>>;

    /// Container details keyed by full container ID
    fn inspect_containers(&self, ids: &[String]) -> Result<HashMap<String, ContainerDetail>>;

    /// Image details keyed by normalized image ID
    fn inspect_images(&self, ids: &[String]) -> Result<HashMap<String, ImageDetail>>;

    /// Volume details keyed by volume name
    fn inspect_volumes(&self, names: &[String]) -> Result<HashMap<String, VolumeDetail>>;

    /// Network details keyed by network ID
    fn inspect_networks(&self, ids: &[String]) -> Result<HashMap<String, NetworkDetail>>;

    /// Image references (`repo:tag`) and normalized IDs used by any container
    fn images_in_use(&self) -> Result<HashSet<String>>;

    /// Volume names mounted by any container
    fn volumes_in_use(&self) -> Result<HashSet<String>>;

    /// Network names attached to any container
    fn networks_in_use(&self) -> Result<HashSet<String>>;

    /// Remove a single resource
    fn remove(&self, kind: ResourceType, id: &str) -> Result<(), RemoveError>;
}
