use super::picker::Picker;
use super::render;
use anyhow::{Result, bail};
use clap::Args;
use docker_sweep::domain::{ContainerRuntime, Resource, Scope, SweepConfig};
use docker_sweep::infra::config::{AppConfig, parse_duration, parse_size};
use docker_sweep::services::{Analyzer, DeletionOrchestrator};
use std::io::{BufRead, IsTerminal, Write};
use std::sync::Arc;
use tracing::info;

/// Flags shared by every sweep command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Skip interaction and delete all suggested resources
    #[arg(short, long, global = true)]
    pub yes: bool,
    /// Show what would be deleted without deleting
    #[arg(long, global = true)]
    pub dry_run: bool,
    /// Only resources older than duration (e.g. 7d, 24h, 1w)
    #[arg(long, global = true, value_name = "DURATION")]
    pub older_than: Option<String>,
    /// Only include containers
    #[arg(short = 'c', long, global = true)]
    pub containers: bool,
    /// Only include images
    #[arg(short = 'i', long, global = true)]
    pub images: bool,
    /// Only include volumes
    #[arg(short = 'v', long, global = true)]
    pub volumes: bool,
    /// Only include networks
    #[arg(short = 'n', long, global = true)]
    pub networks: bool,
}

/// Type-specific filters.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only images larger than size (e.g. 100MB, 1GB)
    #[arg(long, value_name = "SIZE")]
    pub min_size: Option<String>,
    /// Only dangling images
    #[arg(long)]
    pub dangling: bool,
    /// Exclude dangling images
    #[arg(long)]
    pub no_dangling: bool,
    /// Non-interactive garbage collection (implies --yes, includes dangling images)
    #[arg(long)]
    pub gc: bool,
    /// Only exited containers
    #[arg(long)]
    pub exited: bool,
    /// Only anonymous volumes
    #[arg(long)]
    pub anonymous: bool,
}

/// Validated input of one sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepOptions {
    pub config: SweepConfig,
    pub scope: Scope,
}

impl SweepOptions {
    /// Validates flags and merges defaults from the config file.
    ///
    /// `root` marks a sweep without subcommand, which hides dangling images
    /// unless they are requested.
    pub fn build(
        global: &GlobalArgs,
        filters: &FilterArgs,
        scope: Scope,
        root: bool,
        app: &AppConfig,
    ) -> Result<Self> {
        let mut config = SweepConfig {
            yes: global.yes,
            dry_run: global.dry_run,
            dangling: filters.dangling,
            no_dangling: filters.no_dangling,
            exited: filters.exited,
            anonymous: filters.anonymous,
            ..Default::default()
        };
        config.validate(&scope, filters.gc, filters.min_size.is_some())?;

        if filters.gc {
            config.yes = true;
            config.dangling = false;
            config.no_dangling = false;
        } else if root && !filters.dangling && !filters.no_dangling {
            config.no_dangling = true;
        }

        if let Some(raw) = &global.older_than {
            config.older_than = parse_duration(raw)?;
        }
        if let Some(raw) = &filters.min_size {
            config.min_size = parse_size(raw)?;
        }
        app.apply_defaults(&mut config, scope.images)?;

        Ok(Self { config, scope })
    }
}

/// Runs one sweep against `runtime`, printing to stdout.
pub fn run(runtime: Arc<dyn ContainerRuntime>, options: &SweepOptions) -> Result<()> {
    runtime.check_available()?;

    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal() && std::io::stdout().is_terminal();
    let input = interactive.then(|| stdin.lock());

    execute(runtime, options, input, &mut std::io::stdout())
}

/// The sweep flow with explicit input and output.
///
/// `input` is `None` when no terminal is attached; the picker is unavailable then.
pub fn execute<R: BufRead, W: Write>(
    runtime: Arc<dyn ContainerRuntime>,
    options: &SweepOptions,
    input: Option<R>,
    out: &mut W,
) -> Result<()> {
    write!(out, "{}", render::header())?;

    let analysis = Analyzer::new(runtime.clone()).run(&options.scope, &options.config);
    let (result, failures) = analysis.into_result(&options.scope)?;
    for failure in &failures {
        writeln!(out, "  ⚠️  {}s skipped: {:#}", failure.kind, failure.error)?;
    }

    if result.is_empty() {
        write!(out, "{}", render::no_resources())?;
        return Ok(());
    }

    let to_delete: Vec<&dyn Resource> = if options.config.yes {
        result.suggested()
    } else {
        let Some(input) = input else {
            bail!("interactive mode requires a terminal; use --yes to delete suggested resources");
        };
        match Picker::new(&result).run(input, out)? {
            Some(selection) => selection,
            None => {
                info!("selection cancelled");
                return Ok(());
            }
        }
    };

    if to_delete.is_empty() {
        write!(out, "{}", render::no_resources())?;
        return Ok(());
    }

    if options.config.dry_run {
        write!(out, "{}", render::dry_run(&to_delete))?;
        return Ok(());
    }

    info!(count = to_delete.len(), "deleting resources");
    let report = DeletionOrchestrator::new(runtime).delete(&to_delete);
    for error in &report.errors {
        writeln!(out, "{}", render::deletion_error(error))?;
    }
    write!(out, "{}", render::summary(report.deleted, to_delete.len()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docker_sweep::domain::{ConfigError, ResourceType};
    use docker_sweep::infra::config::FiltersConfig;
    use docker_sweep::test_support::{MockRuntime, container, image, volume};
    use std::io::Cursor;
    use std::time::Duration;

    fn yes() -> GlobalArgs {
        GlobalArgs {
            yes: true,
            ..Default::default()
        }
    }

    fn options(global: GlobalArgs, filters: FilterArgs, scope: Scope) -> SweepOptions {
        SweepOptions::build(&global, &filters, scope, true, &AppConfig::default()).unwrap()
    }

    fn sweep(mock: Arc<MockRuntime>, opts: &SweepOptions, input: Option<&str>) -> Result<String> {
        let mut out = Vec::new();
        execute(mock, opts, input.map(Cursor::new), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn root_sweep_hides_dangling_images_by_default() {
        let opts = options(GlobalArgs::default(), FilterArgs::default(), Scope::all());
        assert!(opts.config.no_dangling);

        let opts = SweepOptions::build(
            &GlobalArgs::default(),
            &FilterArgs::default(),
            Scope::only(ResourceType::Image),
            false,
            &AppConfig::default(),
        )
        .unwrap();
        assert!(!opts.config.no_dangling);
    }

    #[test]
    fn gc_implies_yes_and_includes_dangling() {
        let filters = FilterArgs {
            gc: true,
            ..Default::default()
        };
        let opts = options(GlobalArgs::default(), filters, Scope::all());
        assert!(opts.config.yes);
        assert!(!opts.config.no_dangling);
        assert!(!opts.config.dangling);
    }

    #[test]
    fn rejects_invalid_flag_combinations() {
        let filters = FilterArgs {
            gc: true,
            no_dangling: true,
            ..Default::default()
        };
        let err = SweepOptions::build(
            &GlobalArgs::default(),
            &filters,
            Scope::all(),
            true,
            &AppConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::MutuallyExclusive("--gc", "--no-dangling"))
        );

        let global = GlobalArgs {
            older_than: Some("soon".into()),
            ..Default::default()
        };
        assert!(
            SweepOptions::build(
                &global,
                &FilterArgs::default(),
                Scope::all(),
                true,
                &AppConfig::default()
            )
            .is_err()
        );
    }

    #[test]
    fn file_defaults_fill_missing_flags() {
        let app = AppConfig {
            runtime: None,
            filters: FiltersConfig {
                older_than: Some("2w".into()),
                min_size: Some("10MB".into()),
            },
        };
        let opts = SweepOptions::build(
            &GlobalArgs::default(),
            &FilterArgs::default(),
            Scope::all(),
            true,
            &app,
        )
        .unwrap();
        assert_eq!(opts.config.older_than, Some(Duration::from_secs(14 * 86_400)));
        assert_eq!(opts.config.min_size, Some(10 * 1024 * 1024));
    }

    #[test]
    fn yes_deletes_suggested_and_prints_summary() {
        let mock = Arc::new(MockRuntime::new());
        mock.add_container(container("c1", "job", "exited"));
        mock.add_container(container("c2", "web", "running"));
        mock.add_volume(volume("data-01"));

        let out = sweep(mock.clone(), &options(yes(), FilterArgs::default(), Scope::all()), None)
            .unwrap();

        assert_eq!(mock.removal_calls(), vec!["container:c1"]);
        assert!(out.contains("Deleted 1 of 1 resources"));
    }

    #[test]
    fn dry_run_deletes_nothing() {
        let mock = Arc::new(MockRuntime::new());
        mock.add_container(container("c1", "job", "exited"));

        let global = GlobalArgs {
            dry_run: true,
            ..yes()
        };
        let out = sweep(mock.clone(), &options(global, FilterArgs::default(), Scope::all()), None)
            .unwrap();

        assert!(mock.removal_calls().is_empty());
        assert!(out.contains("Dry run - would delete:"));
        assert!(out.contains("job (container)"));
    }

    #[test]
    fn nothing_found() {
        let mock = Arc::new(MockRuntime::new());
        let out = sweep(mock, &options(yes(), FilterArgs::default(), Scope::all()), None).unwrap();
        assert!(out.contains("No resources to delete."));
    }

    #[test]
    fn picker_requires_a_terminal() {
        let mock = Arc::new(MockRuntime::new());
        mock.add_container(container("c1", "job", "exited"));

        let opts = options(GlobalArgs::default(), FilterArgs::default(), Scope::all());
        let err = sweep(mock.clone(), &opts, None).unwrap_err();

        assert!(err.to_string().contains("requires a terminal"));
        assert!(mock.removal_calls().is_empty());
    }

    #[test]
    fn interactive_selection_is_deleted() {
        let mock = Arc::new(MockRuntime::new());
        mock.add_container(container("c1", "job", "exited"));
        mock.add_image(image("sha256:i1", "app", "1.0", 1024));

        let opts = options(GlobalArgs::default(), FilterArgs::default(), Scope::all());
        let out = sweep(mock.clone(), &opts, Some("2\n\n")).unwrap();

        assert_eq!(mock.removal_calls(), vec!["container:c1", "image:sha256:i1"]);
        assert!(out.contains("Deleted 2 of 2 resources"));
    }

    #[test]
    fn quitting_the_picker_deletes_nothing() {
        let mock = Arc::new(MockRuntime::new());
        mock.add_container(container("c1", "job", "exited"));

        let opts = options(GlobalArgs::default(), FilterArgs::default(), Scope::all());
        sweep(mock.clone(), &opts, Some("q\n")).unwrap();

        assert!(mock.removal_calls().is_empty());
    }

    #[test]
    fn deletion_errors_are_listed() {
        let mock = Arc::new(MockRuntime::new());
        mock.add_container(container("c1", "job", "exited"));
        mock.fail_removal_always("c1", "permission denied");

        let out = sweep(mock, &options(yes(), FilterArgs::default(), Scope::all()), None).unwrap();

        assert!(out.contains("job: permission denied"));
        assert!(out.contains("Deleted 0 of 1 resources"));
    }
}
