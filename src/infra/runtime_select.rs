use crate::domain::ConfigError;
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::str::FromStr;
use tracing::debug;

/// Environment variable that forces the runtime binary.
pub const RUNTIME_ENV: &str = "DOCKER_SWEEP_RUNTIME";

/// Container runtime CLI to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeKind {
    Docker,
    Podman,
}

impl RuntimeKind {
    pub fn binary(&self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Podman => "podman",
        }
    }

    /// Picks the runtime in priority order: explicit choice, invoked binary
    /// name, then whichever CLI answers `version` (docker first).
    pub fn detect(explicit: Option<&str>, invoked_path: &Path) -> Result<Self, ConfigError> {
        Self::detect_with(explicit, invoked_path, probe)
    }

    fn detect_with(
        explicit: Option<&str>,
        invoked_path: &Path,
        available: impl Fn(RuntimeKind) -> bool,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = explicit.map(str::trim).filter(|v| !v.is_empty()) {
            return value.parse();
        }

        let binary = invoked_path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if binary.contains("podman") {
            return Ok(Self::Podman);
        }

        if available(Self::Docker) {
            return Ok(Self::Docker);
        }
        if available(Self::Podman) {
            return Ok(Self::Podman);
        }

        // Keep docker so the availability check reports a docker error
        Ok(Self::Docker)
    }
}

impl FromStr for RuntimeKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "docker" => Ok(Self::Docker),
            "podman" => Ok(Self::Podman),
            other => Err(ConfigError::InvalidRuntime(other.to_string())),
        }
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

fn probe(kind: RuntimeKind) -> bool {
    let available = Command::new(kind.binary())
        .arg("version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    debug!(runtime = %kind, available, "probed runtime");
    available
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_choice_wins() {
        let kind =
            RuntimeKind::detect_with(Some(" Podman "), Path::new("/usr/bin/docker-sweep"), |_| {
                true
            })
            .unwrap();
        assert_eq!(kind, RuntimeKind::Podman);
    }

    #[test]
    fn rejects_unknown_runtime() {
        let err = RuntimeKind::detect_with(Some("containerd"), Path::new("x"), |_| true)
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidRuntime("containerd".to_string()));
    }

    #[test]
    fn invoked_name_selects_podman() {
        let kind =
            RuntimeKind::detect_with(None, Path::new("/home/u/.local/bin/podman-sweep"), |_| {
                true
            })
            .unwrap();
        assert_eq!(kind, RuntimeKind::Podman);
    }

    #[test]
    fn probes_docker_before_podman() {
        let path = Path::new("docker-sweep");
        assert_eq!(
            RuntimeKind::detect_with(None, path, |_| true).unwrap(),
            RuntimeKind::Docker
        );
        assert_eq!(
            RuntimeKind::detect_with(None, path, |k| k == RuntimeKind::Podman).unwrap(),
            RuntimeKind::Podman
        );
        assert_eq!(
            RuntimeKind::detect_with(None, path, |_| false).unwrap(),
            RuntimeKind::Docker
        );
    }
}
