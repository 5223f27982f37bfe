//! The builder contract.
//!
//! A [`Builder`] knows how to produce an image for one platform. Builds only
//! ever see this trait, never the concrete platform types behind it.
//!
//! - `prepare` reads the raw configuration, applies defaults, validates it and
//!   keeps whatever it needs for later. It must not create anything outside
//!   the process.
//! - `run` does the actual work. It may touch the outside world, take a long
//!   time, and should report what it is doing through the [`Ui`].

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::core::build::BuildHandle;
use crate::core::ui::Ui;

/// Configuration as handed over by the template layer, before any builder has
/// looked at it.
pub type RawConfig = serde_json::Value;

/// Produces images for one target platform.
pub trait Builder: Send + Sync {
    /// Validate `config` and keep the parsed form for [`Builder::run`].
    fn prepare(&mut self, config: &RawConfig) -> anyhow::Result<()>;

    /// Build the image.
    fn run(&self, build: &BuildHandle<'_>, ui: &dyn Ui) -> anyhow::Result<()>;
}

/// Raw configuration could not be decoded into a builder's settings.
#[derive(Debug, Error, miette::Diagnostic)]
#[error("invalid configuration for `{builder}` builder: {source}")]
#[diagnostic(help("check the `config` table of this build in the template"))]
pub struct ConfigError {
    pub builder: &'static str,
    #[source]
    pub source: serde_json::Error,
}

/// Decode raw configuration into a builder's typed settings.
///
/// A null configuration (no `config` table at all) decodes as an empty
/// object, so settings structs with `#[serde(default)]` fields still work.
pub fn decode_config<T: DeserializeOwned>(
    builder: &'static str,
    config: &RawConfig,
) -> Result<T, ConfigError> {
    let value = if config.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        config.clone()
    };

    serde_json::from_value(value).map_err(|source| ConfigError { builder, source })
}
