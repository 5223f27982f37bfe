//! Drydock - drive many machine-image builds through one lifecycle
//!
//! Each build pairs a platform [`Builder`] with its configuration. Builds are
//! prepared (configuration validated, no side effects) and then run (the
//! image is actually produced), possibly many at once.

pub mod builders;
pub mod core;
pub mod ops;
pub mod util;

/// Test doubles for builders and output sinks.
///
/// Only compiled for unit tests.
#[cfg(test)]
pub mod test_support;

pub use builders::BuilderRegistry;
pub use crate::core::{Build, BuildHandle, Builder, CoreBuild, RawConfig, Ui};
pub use ops::Template;
