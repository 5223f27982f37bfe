//! Command implementations

pub mod build;
pub mod builders;
pub mod validate;

use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use drydock::util::config::{global_config_path, load_config, project_config_path};
use drydock::util::{ColorChoice, Config, Shell};

/// Load config for the current directory.
pub fn current_config() -> Result<Config> {
    let cwd = std::env::current_dir()?;
    let global = global_config_path();
    Ok(load_config(global.as_deref(), &project_config_path(&cwd)))
}

/// Build the shell from global flags, with config as fallback.
pub fn make_shell(global: &GlobalOpts, config: &Config) -> Result<Arc<Shell>> {
    let color = match &global.color {
        Some(c) => c.parse::<ColorChoice>().map_err(|e| anyhow::anyhow!(e))?,
        None => config.color(),
    };

    Ok(Arc::new(Shell::from_flags(
        global.quiet,
        global.verbose,
        color,
        global.json,
    )))
}
