use anyhow::{Context, Result};
use self_update::backends::github::Update;
use self_update::cargo_crate_version;
use tracing::info;

const REPO_OWNER: &str = "midnattsol";
const REPO_NAME: &str = "docker-sweep";
const BIN_NAME: &str = "docker-sweep";

pub fn update(check_only: bool, yes: bool) -> Result<()> {
    let current = cargo_crate_version!();
    println!("\n  Current version: {current}");

    let updater = Update::configure()
        .repo_owner(REPO_OWNER)
        .repo_name(REPO_NAME)
        .bin_name(BIN_NAME)
        .show_download_progress(true)
        .no_confirm(yes)
        .current_version(current)
        .build()
        .context("configuring updater")?;

    let latest = updater
        .get_latest_release()
        .context("checking for updates")?;
    info!(latest = %latest.version, "latest release");

    let newer = self_update::version::bump_is_greater(current, &latest.version).unwrap_or(false);
    if !newer {
        println!("  You're on the latest version\n");
        return Ok(());
    }

    println!("  New version available: {}", latest.version);
    if check_only {
        println!("  Run `docker sweep update` to update.\n");
        return Ok(());
    }

    let status = updater.update().map_err(|e| {
        let mut message = e.to_string();
        if message.to_lowercase().contains("permission denied") {
            message.push_str(
                "\n  Hint: if installed as a Docker plugin, ensure write access to ~/.docker/cli-plugins/docker-sweep",
            );
        }
        anyhow::anyhow!(message)
    })?;

    println!("  Update status: `{}`!\n", status.version());
    Ok(())
}
