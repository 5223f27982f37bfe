//! The `file` builder - writes one file as its artifact.
//!
//! Configuration:
//!
//! ```toml
//! [builds.config]
//! target = "out/motd.txt"   # required
//! content = "welcome"       # either content...
//! source = "motd.in"        # ...or a file to copy, not both
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::core::build::BuildHandle;
use crate::core::builder::{decode_config, Builder, RawConfig};
use crate::core::ui::Ui;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    target: Option<PathBuf>,
    content: Option<String>,
    source: Option<PathBuf>,
}

#[derive(Debug, Clone)]
enum Contents {
    Inline(String),
    Copy(PathBuf),
}

#[derive(Debug, Clone)]
struct Prepared {
    target: PathBuf,
    contents: Contents,
}

/// Builder whose artifact is a single file on the local disk.
#[derive(Debug, Default)]
pub struct FileBuilder {
    prepared: Option<Prepared>,
}

impl FileBuilder {
    pub const TYPE: &'static str = "file";

    pub fn new() -> Self {
        Self::default()
    }
}

impl Builder for FileBuilder {
    fn prepare(&mut self, config: &RawConfig) -> Result<()> {
        let config: FileConfig = decode_config(Self::TYPE, config)?;

        let target = match config.target {
            Some(t) if !t.as_os_str().is_empty() => t,
            _ => bail!("file builder: `target` must be set"),
        };

        let contents = match (config.content, config.source) {
            (Some(_), Some(_)) => bail!("file builder: only one of `content` or `source` may be set"),
            (Some(content), None) => Contents::Inline(content),
            (None, Some(source)) => Contents::Copy(source),
            (None, None) => bail!("file builder: one of `content` or `source` must be set"),
        };

        self.prepared = Some(Prepared { target, contents });
        Ok(())
    }

    fn run(&self, build: &BuildHandle<'_>, ui: &dyn Ui) -> Result<()> {
        let Some(prepared) = &self.prepared else {
            bail!("file builder for `{}` has no validated configuration", build.name());
        };
        let target = &prepared.target;

        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create directory: {}", parent.display())
                })?;
            }
        }

        match &prepared.contents {
            Contents::Inline(content) => {
                ui.say(&format!("writing {}", target.display()));
                std::fs::write(target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
            }
            Contents::Copy(source) => {
                ui.say(&format!("copying {} to {}", source.display(), target.display()));
                std::fs::copy(source, target).with_context(|| {
                    format!(
                        "failed to copy {} to {}",
                        source.display(),
                        target.display()
                    )
                })?;
            }
        }

        tracing::debug!(build = build.name(), target = %target.display(), "file written");
        ui.say(&format!("created {}", target.display()));
        Ok(())
    }
}
