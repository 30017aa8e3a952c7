mod cli;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cli::sweep::{FilterArgs, GlobalArgs, SweepOptions};
use docker_sweep::domain::{ResourceType, Scope};
use docker_sweep::infra::config::{default_config_dir, expand_dir, load_app_config};
use docker_sweep::infra::logging::init_logging;
use docker_sweep::infra::runtime_select::RUNTIME_ENV;
use docker_sweep::infra::{CliRuntime, RuntimeKind};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Argument docker passes when it discovers CLI plugins.
const PLUGIN_METADATA_ARG: &str = "docker-cli-plugin-metadata";
/// Docker passes the plugin name as first argument when run as `docker sweep`.
const PLUGIN_NAME: &str = "sweep";

#[derive(Parser)]
#[command(
    name = "docker-sweep",
    version,
    about = "Interactive container resource cleanup",
    long_about = "docker-sweep analyzes containers, images, volumes and networks and opens a \
picker. Suggested resources (stopped containers, anonymous volumes, unused networks) are \
pre-selected. Dangling images are hidden from root sweeps unless --dangling or --gc is given.\n\n\
Resources labeled sweep.protect=true are never deleted."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(flatten)]
    filters: FilterArgs,

    /// More log output (repeat for debug)
    #[arg(long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration directory (default: ~/.config/docker-sweep)
    #[arg(long, env = "DOCKER_SWEEP_CONFIG_DIR", default_value_os_t = default_config_dir(), global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean up containers
    #[command(visible_alias = "c", alias = "container")]
    Containers {
        /// Only exited containers
        #[arg(long)]
        exited: bool,
    },
    /// Clean up images
    #[command(visible_alias = "i", alias = "image")]
    Images {
        /// Only images larger than size (e.g. 100MB, 1GB)
        #[arg(long, value_name = "SIZE")]
        min_size: Option<String>,
        /// Only dangling images
        #[arg(long)]
        dangling: bool,
        /// Exclude dangling images
        #[arg(long)]
        no_dangling: bool,
    },
    /// Clean up volumes
    #[command(visible_alias = "v", alias = "volume")]
    Volumes {
        /// Only anonymous volumes
        #[arg(long)]
        anonymous: bool,
    },
    /// Clean up networks
    #[command(visible_alias = "n", alias = "network")]
    Networks,
    /// Update docker-sweep to the latest release
    Update {
        /// Only check for a newer release
        #[arg(long)]
        check: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PluginMetadata {
    schema_version: &'static str,
    vendor: &'static str,
    version: &'static str,
    short_description: &'static str,
}

fn print_plugin_metadata() -> Result<()> {
    let metadata = PluginMetadata {
        schema_version: "0.1.0",
        vendor: "midnattsol",
        version: env!("CARGO_PKG_VERSION"),
        short_description: "Interactive Docker resource cleanup",
    };
    println!("{}", serde_json::to_string(&metadata)?);
    Ok(())
}

/// What the parsed command line asks for.
enum Target {
    Update { check: bool },
    /// `root` marks a sweep without subcommand.
    Sweep {
        filters: FilterArgs,
        scope: Scope,
        root: bool,
    },
}

fn target(cli: &Cli) -> Target {
    let (filters, scope, root) = match &cli.command {
        Some(Commands::Update { check }) => return Target::Update { check: *check },
        Some(Commands::Containers { exited }) => (
            FilterArgs {
                exited: *exited,
                ..Default::default()
            },
            Scope::only(ResourceType::Container),
            false,
        ),
        Some(Commands::Images {
            min_size,
            dangling,
            no_dangling,
        }) => (
            FilterArgs {
                min_size: min_size.clone(),
                dangling: *dangling,
                no_dangling: *no_dangling,
                ..Default::default()
            },
            Scope::only(ResourceType::Image),
            false,
        ),
        Some(Commands::Volumes { anonymous }) => (
            FilterArgs {
                anonymous: *anonymous,
                ..Default::default()
            },
            Scope::only(ResourceType::Volume),
            false,
        ),
        Some(Commands::Networks) => (
            FilterArgs::default(),
            Scope::only(ResourceType::Network),
            false,
        ),
        None => {
            let g = &cli.global;
            let scope = Scope::from_flags(g.containers, g.images, g.volumes, g.networks);
            (cli.filters.clone(), scope, true)
        }
    };
    Target::Sweep {
        filters,
        scope,
        root,
    }
}

fn main() -> Result<()> {
    let mut args: Vec<OsString> = std::env::args_os().collect();
    if args.get(1).is_some_and(|a| a == PLUGIN_METADATA_ARG) {
        return print_plugin_metadata();
    }
    if args.get(1).is_some_and(|a| a == PLUGIN_NAME) {
        args.remove(1);
    }

    let cli = Cli::parse_from(&args);
    init_logging(cli.verbose);

    let (filters, scope, root) = match target(&cli) {
        Target::Update { check } => return cli::update::update(check, cli.global.yes),
        Target::Sweep {
            filters,
            scope,
            root,
        } => (filters, scope, root),
    };

    let config_dir = expand_dir(&cli.config_dir);
    let app = load_app_config(&config_dir)
        .with_context(|| format!("loading configuration from {config_dir:?}"))?;

    let options = SweepOptions::build(&cli.global, &filters, scope, root, &app)?;

    let explicit = std::env::var(RUNTIME_ENV).ok().or(app.runtime.clone());
    let invoked = args.first().map(PathBuf::from).unwrap_or_default();
    let kind = RuntimeKind::detect(explicit.as_deref(), Path::new(&invoked))?;
    info!(runtime = %kind, "using container runtime");

    cli::sweep::run(Arc::new(CliRuntime::new(kind)), &options)
}
