//! The `null` builder - produces nothing.
//!
//! Handy for exercising a template end to end without touching any platform.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::build::BuildHandle;
use crate::core::builder::{decode_config, Builder, RawConfig};
use crate::core::ui::Ui;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct NullConfig {
    /// Extra line to say while running
    message: Option<String>,
}

/// Builder that only reports that it ran.
#[derive(Debug, Default)]
pub struct NullBuilder {
    config: NullConfig,
}

impl NullBuilder {
    pub const TYPE: &'static str = "null";

    pub fn new() -> Self {
        Self::default()
    }
}

impl Builder for NullBuilder {
    fn prepare(&mut self, config: &RawConfig) -> Result<()> {
        self.config = decode_config(Self::TYPE, config).context("failed to prepare null builder")?;
        Ok(())
    }

    fn run(&self, build: &BuildHandle<'_>, ui: &dyn Ui) -> Result<()> {
        if let Some(message) = &self.config.message {
            ui.say(message);
        }
        ui.say(&format!("{} finished without producing an artifact", build.name()));
        Ok(())
    }
}
