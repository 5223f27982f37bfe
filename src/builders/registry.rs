//! Builder registry - maps a template `type` to a builder factory.
//!
//! Registry construction never fails and does no I/O. Each lookup creates a
//! fresh builder, since a builder keeps its prepared configuration and every
//! build must own its own.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::builders::file::FileBuilder;
use crate::builders::null::NullBuilder;
use crate::core::builder::Builder;

/// Creates a new, unprepared builder.
pub type BuilderFactory = fn() -> Box<dyn Builder>;

/// A registered builder type.
#[derive(Debug, Clone, Copy)]
pub struct BuilderEntry {
    /// Name used as `type` in templates
    pub name: &'static str,

    /// One-line description for `drydock builders`
    pub description: &'static str,

    factory: BuilderFactory,
}

/// Lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error, miette::Diagnostic)]
pub enum RegistryError {
    #[error("unknown builder type `{name}`; available types: {available}")]
    #[diagnostic(help("run `drydock builders` to list builder types"))]
    UnknownType { name: String, available: String },
}

/// Registry of builder types.
pub struct BuilderRegistry {
    entries: BTreeMap<&'static str, BuilderEntry>,
}

impl BuilderRegistry {
    /// Create a registry holding every built-in builder.
    pub fn new() -> Self {
        let mut registry = BuilderRegistry::empty();

        registry.register(
            NullBuilder::TYPE,
            "Does nothing; useful for checking templates and output",
            || Box::new(NullBuilder::new()),
        );
        registry.register(
            FileBuilder::TYPE,
            "Writes a single file as the artifact",
            || Box::new(FileBuilder::new()),
        );

        registry
    }

    /// Create a registry with no builders.
    pub fn empty() -> Self {
        BuilderRegistry {
            entries: BTreeMap::new(),
        }
    }

    /// Register a builder type, replacing any previous one with the same name.
    pub fn register(
        &mut self,
        name: &'static str,
        description: &'static str,
        factory: BuilderFactory,
    ) {
        if self.entries.contains_key(name) {
            tracing::debug!(builder = name, "replacing registered builder");
        }
        self.entries.insert(
            name,
            BuilderEntry {
                name,
                description,
                factory,
            },
        );
    }

    /// Create a fresh builder of the given type.
    pub fn create(&self, name: &str) -> Result<Box<dyn Builder>, RegistryError> {
        self.entries
            .get(name)
            .map(|entry| (entry.factory)())
            .ok_or_else(|| RegistryError::UnknownType {
                name: name.to_string(),
                available: self.names().collect::<Vec<_>>().join(", "),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered type names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// Registered entries in sorted order.
    pub fn entries(&self) -> impl Iterator<Item = &BuilderEntry> + '_ {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BuilderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
