//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Drydock - build machine images from a template
#[derive(Parser)]
#[command(name = "drydock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true)]
    pub color: Option<String>,

    /// Output format for messages
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Flags shared by every subcommand.
    pub fn global_opts(&self) -> GlobalOpts {
        GlobalOpts {
            verbose: self.verbose,
            quiet: self.quiet,
            color: self.color.clone(),
            json: self.message_format == MessageFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

/// Global flags, split off so commands can take them by reference.
#[derive(Debug, Clone)]
pub struct GlobalOpts {
    pub verbose: bool,
    pub quiet: bool,
    pub color: Option<String>,
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Prepare and run the builds in a template
    Build(BuildArgs),

    /// Check a template without building anything
    Validate(ValidateArgs),

    /// List available builder types
    Builders,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Template file (TOML or JSON)
    #[arg(default_value = "drydock.toml")]
    pub template: PathBuf,

    /// Only run the named builds
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Run every build except the named ones
    #[arg(long, value_delimiter = ',')]
    pub except: Vec<String>,

    /// Run builds concurrently (default from config, else true)
    #[arg(long)]
    pub parallel: Option<bool>,

    /// Number of parallel build workers
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Template file (TOML or JSON)
    #[arg(default_value = "drydock.toml")]
    pub template: PathBuf,
}
