//! Build templates.
//!
//! A template lists the builds to run. It can be TOML or JSON, chosen by file
//! extension:
//!
//! ```toml
//! [[builds]]
//! name = "image-a"     # optional, defaults to the type
//! type = "file"
//! [builds.config]      # handed to the builder untouched
//! target = "out/a.txt"
//! content = "hello"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::builders::BuilderRegistry;
use crate::core::builder::RawConfig;

/// Problems loading or checking a template.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum TemplateError {
    #[error("failed to read template {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse template {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("template {} has no builds", path.display())]
    #[diagnostic(help("add at least one [[builds]] entry"))]
    Empty { path: PathBuf },

    #[error("a build of type `{kind}` has an empty name")]
    #[diagnostic(help("remove `name` to use the type, or set a non-empty one"))]
    EmptyName { kind: String },

    #[error("build name `{name}` is used more than once")]
    #[diagnostic(help("give each build a unique `name`"))]
    DuplicateName { name: String },

    #[error("build `{build}` has unknown type `{kind}`; available types: {available}")]
    #[diagnostic(help("run `drydock builders` to list builder types"))]
    UnknownType {
        build: String,
        kind: String,
        available: String,
    },
}

/// One build as written in the template.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSpec {
    /// Build name; defaults to the builder type
    #[serde(default)]
    name: Option<String>,

    /// Builder type
    #[serde(rename = "type")]
    pub kind: String,

    /// Opaque builder configuration
    #[serde(default)]
    pub config: RawConfig,
}

impl BuildSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, config: RawConfig) -> Self {
        BuildSpec {
            name: Some(name.into()),
            kind: kind.into(),
            config,
        }
    }

    /// The build name, falling back to the builder type.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.kind)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateFile {
    #[serde(default)]
    builds: Vec<BuildSpec>,
}

/// A parsed template.
#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    builds: Vec<BuildSpec>,
}

impl Template {
    /// Read and parse a template file. No validation beyond syntax.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let contents = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    /// Parse template text. `path` selects the format and is used in errors.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, TemplateError> {
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        let parsed: Result<TemplateFile, String> = if is_json {
            serde_json::from_str(contents).map_err(|e| e.to_string())
        } else {
            toml::from_str(contents).map_err(|e| e.to_string())
        };

        let file = parsed.map_err(|message| TemplateError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        tracing::debug!(
            template = %path.display(),
            builds = file.builds.len(),
            "loaded template"
        );

        Ok(Template {
            path: path.to_path_buf(),
            builds: file.builds,
        })
    }

    /// Check that the template has builds, names are non-empty and unique,
    /// and every type is known to `registry`.
    pub fn validate(&self, registry: &BuilderRegistry) -> Result<(), TemplateError> {
        if self.builds.is_empty() {
            return Err(TemplateError::Empty {
                path: self.path.clone(),
            });
        }

        let mut seen = HashSet::new();
        for spec in &self.builds {
            if spec.name().trim().is_empty() {
                return Err(TemplateError::EmptyName {
                    kind: spec.kind.clone(),
                });
            }

            if !seen.insert(spec.name()) {
                return Err(TemplateError::DuplicateName {
                    name: spec.name().to_string(),
                });
            }

            if !registry.contains(&spec.kind) {
                return Err(TemplateError::UnknownType {
                    build: spec.name().to_string(),
                    kind: spec.kind.clone(),
                    available: registry.names().collect::<Vec<_>>().join(", "),
                });
            }
        }

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn builds(&self) -> &[BuildSpec] {
        &self.builds
    }

    /// Build names in template order.
    pub fn build_names(&self) -> Vec<&str> {
        self.builds.iter().map(|b| b.name()).collect()
    }
}
