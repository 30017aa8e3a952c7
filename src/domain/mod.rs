pub mod container;
pub mod image;
pub mod listing;
pub mod network;
pub mod options;
pub mod resource;
pub mod traits;
pub mod volume;

pub use container::ContainerResource;
pub use image::ImageResource;
pub use network::{NetworkResource, SYSTEM_NETWORKS, is_system_network};
pub use options::{ConfigError, Scope, SweepConfig};
pub use resource::{
    Category, ComposeResource, LABEL_PROTECT, Labels, Resource, ResourceType, compose_project,
};
pub use traits::{ContainerRuntime, RemoveError};
pub use volume::{VolumeResource, is_anonymous_volume};
