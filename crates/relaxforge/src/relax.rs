//! Session entry point that reads its settings from disk.

use std::path::Path;

use relaxforge_config::LrConfig;
use relaxforge_core::{Model, Result};
use relaxforge_solver::{LagrangianModel, LrOutcome};
use tracing::debug;

/// Configuration file read by [`run_relaxation`], relative to the working
/// directory.
pub const CONFIG_FILE: &str = "relaxation.toml";

/// Runs a relaxation session configured by `relaxation.toml`.
///
/// See [`run_relaxation_from`].
pub fn run_relaxation<M: Model>(lr: &mut LagrangianModel<M>) -> Result<LrOutcome> {
    run_relaxation_from(lr, CONFIG_FILE)
}

/// Runs a relaxation session configured by the TOML file at `path`.
///
/// A missing file falls back to the default configuration. With the
/// `console` feature, console output is initialized first.
///
/// # Errors
///
/// [`RelaxForgeError::Config`](relaxforge_core::RelaxForgeError::Config) if
/// the file exists but cannot be read or parsed, and any error of
/// [`LagrangianModel::optimize`].
pub fn run_relaxation_from<M: Model>(
    lr: &mut LagrangianModel<M>,
    path: impl AsRef<Path>,
) -> Result<LrOutcome> {
    #[cfg(feature = "console")]
    relaxforge_console::init();

    let path = path.as_ref();
    let config = match LrConfig::load(path) {
        Ok(config) => config,
        Err(e) if e.is_not_found() => {
            debug!(event = "config_default", file = %path.display());
            LrConfig::default()
        }
        Err(e) => return Err(e.into()),
    };

    lr.optimize(&config)
}
