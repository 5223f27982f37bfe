//! Shared utilities

pub mod config;
pub mod shell;

pub use config::Config;
pub use shell::{ColorChoice, Shell, ShellMode, Status};
