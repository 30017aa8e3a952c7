pub mod domain;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
pub mod test_support;

pub use domain::{Category, ContainerRuntime, Resource, ResourceType, Scope, SweepConfig};
pub use infra::{CliRuntime, RuntimeKind};
pub use services::{Analyzer, DeletionOrchestrator, DeletionReport, SweepResult};
