//! Test doubles for builders and output sinks.
//!
//! # Example
//!
//! ```rust,ignore
//! use drydock::test_support::{CaptureUi, RecordingBuilder};
//!
//! let recorder = RecordingBuilder::new();
//! let mut build = CoreBuild::new("image-a", Box::new(recorder.clone()), json!({}));
//! build.prepare()?;
//! build.run(&CaptureUi::new())?;
//! assert_eq!(recorder.run_count(), 1);
//! ```

pub mod fixtures;

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use crate::core::build::BuildHandle;
use crate::core::builder::{Builder, RawConfig};
use crate::core::ui::Ui;

pub use fixtures::*;

/// One call observed by a [`RecordingBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// `prepare` with the configuration it received
    Prepare(RawConfig),
    /// `run` with the name read from the build handle
    Run { build: String },
}

/// Builder that records every call into a log shared by all its clones.
///
/// Hand one clone to a build and keep another to inspect afterwards. On run
/// it says `built` to the sink.
#[derive(Debug, Clone, Default)]
pub struct RecordingBuilder {
    calls: Arc<Mutex<Vec<Call>>>,
    prepare_error: Option<String>,
    run_error: Option<String>,
}

impl RecordingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder whose `prepare` returns an error with this message.
    pub fn failing_prepare(message: impl Into<String>) -> Self {
        RecordingBuilder {
            prepare_error: Some(message.into()),
            ..Self::default()
        }
    }

    /// A recorder whose `run` returns an error with this message.
    pub fn failing_run(message: impl Into<String>) -> Self {
        RecordingBuilder {
            run_error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn prepare_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Prepare(_)))
            .count()
    }

    pub fn run_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Run { .. }))
            .count()
    }
}

impl Builder for RecordingBuilder {
    fn prepare(&mut self, config: &RawConfig) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Prepare(config.clone()));

        if let Some(msg) = &self.prepare_error {
            bail!("{}", msg);
        }
        Ok(())
    }

    fn run(&self, build: &BuildHandle<'_>, ui: &dyn Ui) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Run {
            build: build.name().to_string(),
        });

        if let Some(msg) = &self.run_error {
            bail!("{}", msg);
        }

        ui.say("built");
        Ok(())
    }
}

/// Sink that keeps every message in memory.
#[derive(Debug, Default)]
pub struct CaptureUi {
    messages: Mutex<Vec<String>>,
}

impl CaptureUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Ui for CaptureUi {
    fn say(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
