//! Built-in builders and the registry that creates them.
//!
//! Platform builders (virtual machines, containers, cloud images) plug in
//! through [`BuilderRegistry::register`]; the two built-ins here need nothing
//! beyond the local filesystem.

pub mod file;
pub mod null;
pub mod registry;

pub use file::FileBuilder;
pub use null::NullBuilder;
pub use registry::{BuilderEntry, BuilderFactory, BuilderRegistry, RegistryError};
