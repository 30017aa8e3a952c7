use super::container_analyzer::ContainerAnalyzer;
use super::image_analyzer::ImageAnalyzer;
use super::network_analyzer::NetworkAnalyzer;
use super::result::SweepResult;
use super::volume_analyzer::VolumeAnalyzer;
use crate::domain::{ContainerRuntime, ResourceType, Scope, SweepConfig};
use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// A kind whose analysis failed; the other kinds are unaffected.
#[derive(Debug)]
pub struct AnalysisFailure {
    pub kind: ResourceType,
    pub error: anyhow::Error,
}

#[derive(Debug, Default)]
pub struct Analysis {
    pub result: SweepResult,
    pub failures: Vec<AnalysisFailure>,
}

/// Runs the analyzers of every kind in scope, one thread per kind.
pub struct Analyzer {
    containers: ContainerAnalyzer,
    images: ImageAnalyzer,
    volumes: VolumeAnalyzer,
    networks: NetworkAnalyzer,
}

impl Analyzer {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self {
            containers: ContainerAnalyzer::new(runtime.clone()),
            images: ImageAnalyzer::new(runtime.clone()),
            volumes: VolumeAnalyzer::new(runtime.clone()),
            networks: NetworkAnalyzer::new(runtime),
        }
    }

    pub fn run(&self, scope: &Scope, config: &SweepConfig) -> Analysis {
        self.run_at(scope, config, Utc::now())
    }

    pub fn run_at(&self, scope: &Scope, config: &SweepConfig, now: DateTime<Utc>) -> Analysis {
        let mut analysis = Analysis::default();
        let result = &mut analysis.result;
        let mut failures = Vec::new();

        thread::scope(|s| {
            let containers = scope
                .containers
                .then(|| s.spawn(|| self.containers.analyze_at(config, now)));
            let images = scope
                .images
                .then(|| s.spawn(|| self.images.analyze_at(config, now)));
            let volumes = scope
                .volumes
                .then(|| s.spawn(|| self.volumes.analyze_at(config, now)));
            let networks = scope
                .networks
                .then(|| s.spawn(|| self.networks.analyze_at(config, now)));

            if let Some(handle) = containers {
                collect(
                    ResourceType::Container,
                    join(handle),
                    &mut result.containers,
                    &mut failures,
                );
            }
            if let Some(handle) = images {
                collect(
                    ResourceType::Image,
                    join(handle),
                    &mut result.images,
                    &mut failures,
                );
            }
            if let Some(handle) = volumes {
                collect(
                    ResourceType::Volume,
                    join(handle),
                    &mut result.volumes,
                    &mut failures,
                );
            }
            if let Some(handle) = networks {
                collect(
                    ResourceType::Network,
                    join(handle),
                    &mut result.networks,
                    &mut failures,
                );
            }
        });

        analysis.failures = failures;
        analysis
    }
}

impl Analysis {
    /// Fails only when every kind in scope failed.
    pub fn into_result(self, scope: &Scope) -> Result<(SweepResult, Vec<AnalysisFailure>)> {
        let attempted = scope.kinds().count();
        if attempted > 0 && self.failures.len() == attempted {
            let reasons: Vec<String> = self
                .failures
                .iter()
                .map(|f| format!("{}s: {:#}", f.kind, f.error))
                .collect();
            bail!(
                "analysis failed for every resource type: {}",
                reasons.join("; ")
            );
        }
        Ok((self.result, self.failures))
    }
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, Result<T>>) -> Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(anyhow!("analyzer thread panicked")))
}

fn collect<T>(
    kind: ResourceType,
    outcome: Result<Vec<T>>,
    slot: &mut Vec<T>,
    failures: &mut Vec<AnalysisFailure>,
) {
    match outcome {
        Ok(resources) => {
            debug!(%kind, count = resources.len(), "analysis finished");
            *slot = resources;
        }
        Err(error) => {
            warn!("Failed to analyze {kind}s: {error:#}");
            failures.push(AnalysisFailure { kind, error });
        }
    }
}
