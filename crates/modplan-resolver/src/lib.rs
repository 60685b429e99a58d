//! Modplan dependency resolution
//!
//! Turns a [`ModuleSet`](modplan_descriptor::ModuleSet) and a
//! [`TargetContext`](modplan_descriptor::TargetContext) into a validated,
//! acyclic [`DependencyGraph`] with a deterministic build order.
//!
//! The pipeline runs in three stages:
//!
//! 1. [`validate`] gates each module on the build target type.
//! 2. [`resolve`] evaluates engine-version conditions into plain name sets.
//! 3. The [`Assembler`] merges the resolved modules, rejecting visibility
//!    conflicts, unknown references and public/private cycles, then orders
//!    the graph topologically (ties broken by ascending name).
//!
//! [`plan`] drives all three over a module set, either aggregating every
//! error or stopping at the first one.
//!
//! ```
//! use modplan_descriptor::{EngineVersion, ModuleDescriptor, ModuleSet, TargetContext, TargetType};
//! use modplan_resolver::{plan, PlanOptions};
//!
//! let set = ModuleSet::from_descriptors([
//!     ModuleDescriptor::external("Core"),
//!     ModuleDescriptor::new("Engine").public("Core"),
//! ])?;
//! let context = TargetContext::new(TargetType::Game, EngineVersion::new(5, 1));
//! let graph = plan(&set, &context, PlanOptions::default())?;
//! assert_eq!(graph.position("Core"), Some(0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assembler;
pub mod errors;
pub mod graph;
pub mod plan;
pub mod resolved;
pub mod validator;
pub mod version;

pub use assembler::{assemble, assemble_with, check_module, Assembler, VisibilityPolicy};
pub use errors::{AssemblyError, ErrorKind, PlanError, ResolveError, ValidationError};
pub use graph::{DependencyGraph, Edge};
pub use plan::{
    plan, resolve_modules, BuildPlan, ModuleResults, PlanOptions, PlannedModule, ResolutionMode,
};
pub use resolved::ResolvedModule;
pub use validator::validate;
pub use version::resolve;
