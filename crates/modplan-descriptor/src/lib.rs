//! Modplan module descriptors
//!
//! This crate holds the declared side of module resolution: the types a
//! build-module descriptor states (target restriction, include paths, and
//! public/private/dynamic dependencies with optional engine version gates),
//! the per-invocation target context, and loading of `*.module.toml`
//! descriptor documents into an explicit [`ModuleSet`].

pub mod context;
pub mod discovery;
pub mod errors;
pub mod module_set;
pub mod types;

pub use context::TargetContext;
pub use discovery::{discover, load_document, load_module_set, parse_document, DESCRIPTOR_SUFFIX};
pub use errors::DescriptorError;
pub use module_set::ModuleSet;
pub use types::{
    Dependencies, DescriptorDocument, EngineVersion, ExternalModules, IncludePath, IncludePaths,
    ModuleDescriptor, ModuleRef, PchUsage, TargetType, VersionCondition, Visibility,
};
