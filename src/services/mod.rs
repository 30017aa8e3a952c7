mod analysis;
mod container_analyzer;
pub mod filters;
mod image_analyzer;
mod inspect;
mod network_analyzer;
mod orchestrator;
mod result;
mod volume_analyzer;

pub use analysis::{Analysis, AnalysisFailure, Analyzer};
pub use container_analyzer::{ContainerAnalyzer, PROTECTED_BY_LABEL, categorize_container};
pub use image_analyzer::{ImageAnalyzer, categorize_image, is_image_in_use};
pub use network_analyzer::{NetworkAnalyzer, categorize_network};
pub use orchestrator::{DeletionError, DeletionOrchestrator, DeletionReport, MAX_IMAGE_PASSES};
pub use result::SweepResult;
pub use volume_analyzer::{VolumeAnalyzer, categorize_volume};
