//! High-level operations.
//!
//! This module contains the implementation of Drydock commands.

pub mod drydock_build;
pub mod drydock_validate;
pub mod template;

pub use drydock_build::{
    build, create_builds, prepare_builds, run_builds, select_builds, BuildFailure, BuildOptions,
    BuildOutcome, BuildReport, FailedBuild,
};
pub use drydock_validate::validate;
pub use template::{BuildSpec, Template, TemplateError};
