use super::resource::ResourceType;
use std::time::Duration;
use thiserror::Error;

/// Read-only sweep options shared by every analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepConfig {
    /// Non-interactive: delete every suggested resource
    pub yes: bool,
    pub dry_run: bool,
    /// Only resources older than this
    pub older_than: Option<Duration>,
    /// Only images at least this many bytes
    pub min_size: Option<u64>,
    /// Only dangling images
    pub dangling: bool,
    /// Exclude dangling images
    pub no_dangling: bool,
    /// Only exited containers
    pub exited: bool,
    /// Only anonymous volumes
    pub anonymous: bool,
}

/// Resource kinds included in one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub containers: bool,
    pub images: bool,
    pub volumes: bool,
    pub networks: bool,
}

impl Scope {
    pub fn all() -> Self {
        Self {
            containers: true,
            images: true,
            volumes: true,
            networks: true,
        }
    }

    pub fn only(kind: ResourceType) -> Self {
        Self {
            containers: kind == ResourceType::Container,
            images: kind == ResourceType::Image,
            volumes: kind == ResourceType::Volume,
            networks: kind == ResourceType::Network,
        }
    }

    /// Builds a scope from explicit kind flags; no flag means every kind.
    pub fn from_flags(containers: bool, images: bool, volumes: bool, networks: bool) -> Self {
        if !(containers || images || volumes || networks) {
            return Self::all();
        }
        Self {
            containers,
            images,
            volumes,
            networks,
        }
    }

    pub fn includes(&self, kind: ResourceType) -> bool {
        match kind {
            ResourceType::Container => self.containers,
            ResourceType::Image => self.images,
            ResourceType::Volume => self.volumes,
            ResourceType::Network => self.networks,
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = ResourceType> + '_ {
        ResourceType::ALL.into_iter().filter(|k| self.includes(*k))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{flag} only applies to {kind}s; include --{kind}s or -{short}")]
    FlagOutOfScope {
        flag: &'static str,
        kind: ResourceType,
        short: char,
    },
    #[error("{0} and {1} are mutually exclusive")]
    MutuallyExclusive(&'static str, &'static str),
    #[error("invalid duration: {0} (use format like 7d, 2w, 24h)")]
    InvalidDuration(String),
    #[error("invalid size: {0} (use format like 100MB, 1GB)")]
    InvalidSize(String),
    #[error("invalid runtime {0:?} (expected docker or podman)")]
    InvalidRuntime(String),
}

impl SweepConfig {
    /// Rejects flag combinations before any analysis starts.
    ///
    /// `min_size_requested` reports whether a size filter was given explicitly,
    /// since a size coming from the config file applies only when images are swept.
    pub fn validate(
        &self,
        scope: &Scope,
        gc: bool,
        min_size_requested: bool,
    ) -> Result<(), ConfigError> {
        let out_of_scope = |flag, kind, short| ConfigError::FlagOutOfScope { flag, kind, short };

        if self.exited && !scope.containers {
            return Err(out_of_scope("--exited", ResourceType::Container, 'c'));
        }
        if min_size_requested && !scope.images {
            return Err(out_of_scope("--min-size", ResourceType::Image, 'i'));
        }
        if self.dangling && !scope.images {
            return Err(out_of_scope("--dangling", ResourceType::Image, 'i'));
        }
        if self.no_dangling && !scope.images {
            return Err(out_of_scope("--no-dangling", ResourceType::Image, 'i'));
        }
        if self.dangling && self.no_dangling {
            return Err(ConfigError::MutuallyExclusive("--dangling", "--no-dangling"));
        }
        if gc && self.dangling {
            return Err(ConfigError::MutuallyExclusive("--gc", "--dangling"));
        }
        if gc && self.no_dangling {
            return Err(ConfigError::MutuallyExclusive("--gc", "--no-dangling"));
        }
        if self.anonymous && !scope.volumes {
            return Err(out_of_scope("--anonymous", ResourceType::Volume, 'v'));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_flags_select_every_kind() {
        assert_eq!(Scope::from_flags(false, false, false, false), Scope::all());
        let images = Scope::from_flags(false, true, false, false);
        assert_eq!(images.kinds().collect::<Vec<_>>(), vec![ResourceType::Image]);
    }

    #[test]
    fn rejects_mutually_exclusive_dangling_flags() {
        let cfg = SweepConfig {
            dangling: true,
            no_dangling: true,
            ..Default::default()
        };
        assert_eq!(
            cfg.validate(&Scope::all(), false, false),
            Err(ConfigError::MutuallyExclusive("--dangling", "--no-dangling"))
        );
    }

    #[test]
    fn rejects_gc_with_dangling() {
        let cfg = SweepConfig {
            dangling: true,
            ..Default::default()
        };
        assert!(cfg.validate(&Scope::all(), true, false).is_err());
    }

    #[test]
    fn rejects_type_specific_flags_out_of_scope() {
        let volumes_only = Scope::only(ResourceType::Volume);

        let exited = SweepConfig {
            exited: true,
            ..Default::default()
        };
        let err = exited.validate(&volumes_only, false, false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "--exited only applies to containers; include --containers or -c"
        );

        assert!(
            SweepConfig::default()
                .validate(&volumes_only, false, true)
                .is_err()
        );

        let anonymous = SweepConfig {
            anonymous: true,
            ..Default::default()
        };
        assert!(anonymous.validate(&volumes_only, false, false).is_ok());
        assert!(
            anonymous
                .validate(&Scope::only(ResourceType::Image), false, false)
                .is_err()
        );
    }
}
