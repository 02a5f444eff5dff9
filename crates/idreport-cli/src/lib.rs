pub mod input;
pub mod output;
pub mod runner;

use std::path::PathBuf;

use anyhow::Context;
use directories::ProjectDirs;

/// Per-user scheme registry: `<config dir>/idreport/schemes.json`
pub fn default_registry_path() -> anyhow::Result<PathBuf> {
    let dirs = ProjectDirs::from("org", "idreport", "idreport")
        .context("Failed to locate a home directory for the scheme registry, try `--registry`")?;
    Ok(dirs.config_dir().join("schemes.json"))
}
