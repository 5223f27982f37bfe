//! Build event types for JSON output.
//!
//! Emitted one object per line when running with `--message-format=json`.
//!
//! # Event Types
//!
//! - `build-message`: a builder said something
//! - `build-prepared`: a build's configuration was accepted
//! - `build-finished`: one build completed (success or failure)
//! - `run-finished`: every selected build has completed
//! - `build-progress`: count of completed builds (emitted by the shell)
//!
//! New fields may be added; existing fields are not removed or renamed.

use serde::Serialize;

/// An event emitted while driving builds.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason")]
pub enum BuildEvent {
    /// A builder reported progress.
    #[serde(rename = "build-message")]
    Message {
        /// Message text, already prefixed with the build name when it came
        /// through a prefixed sink
        message: String,
    },

    /// A build passed its prepare phase.
    #[serde(rename = "build-prepared")]
    Prepared {
        /// Build name
        build: String,
    },

    /// A build's run completed.
    #[serde(rename = "build-finished")]
    Finished {
        /// Build name
        build: String,
        /// Whether the builder returned success
        success: bool,
        /// Run duration in milliseconds
        duration_ms: u64,
        /// Error text when the build failed
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// All builds completed.
    #[serde(rename = "run-finished")]
    RunFinished {
        /// Builds that succeeded
        succeeded: u64,
        /// Builds that failed
        failed: u64,
        /// Wall-clock duration in milliseconds
        duration_ms: u64,
    },
}

impl BuildEvent {
    /// Convert to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
