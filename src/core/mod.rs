//! The build lifecycle.
//!
//! - [`build`]: a build job and its prepare/run ordering
//! - [`builder`]: the contract every platform builder implements
//! - [`ui`]: where builders send progress messages
//! - [`events`]: machine-readable events for JSON output

pub mod build;
pub mod builder;
pub mod events;
pub mod ui;

pub use build::{Build, BuildHandle, CoreBuild};
pub use builder::{decode_config, Builder, ConfigError, RawConfig};
pub use events::BuildEvent;
pub use ui::{PrefixedUi, ShellUi, Ui};
