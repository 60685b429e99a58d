//! Version-conditioned fragment expansion
//!
//! Resolution looks at one descriptor at a time. Conflicts between visibility
//! classes survive this step untouched and are reported by the assembler.

use modplan_descriptor::{IncludePath, ModuleDescriptor, ModuleRef, TargetContext, Visibility};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::trace;

use crate::resolved::ResolvedModule;

/// Collapse a descriptor into plain name sets for `context.engine_version`
pub fn resolve(descriptor: &ModuleDescriptor, context: &TargetContext) -> ResolvedModule {
    let version = context.engine_version;
    let mut resolved = ResolvedModule::leaf(descriptor.name.clone());
    resolved.external = descriptor.external;
    resolved.target_restriction = descriptor.target_restriction;
    resolved.pch_usage = descriptor.pch_usage;
    resolved.include_paths_public = active_paths(&descriptor.include_paths.public, context);
    resolved.include_paths_private = active_paths(&descriptor.include_paths.private, context);

    for visibility in Visibility::ALL {
        *resolved.deps_mut(visibility) =
            active_refs(&descriptor.name, descriptor.dependencies.of(visibility), context);
    }

    trace!(
        "Resolved '{}' for engine {}: {} public, {} private, {} dynamic",
        descriptor.name,
        version,
        resolved.deps_public.len(),
        resolved.deps_private.len(),
        resolved.deps_dynamic.len()
    );
    resolved
}

fn active_refs(module: &str, refs: &[ModuleRef], context: &TargetContext) -> BTreeSet<Arc<str>> {
    refs.iter()
        .filter(|r| {
            let keep = r.applies_to(context.engine_version);
            if !keep {
                trace!(
                    "Dropping '{}' from '{}': condition not met by engine {}",
                    r.target_name,
                    module,
                    context.engine_version
                );
            }
            keep
        })
        .map(|r| r.target_name.clone())
        .collect()
}

/// Keeps declared order, dropping repeats of a path already kept
fn active_paths(paths: &[IncludePath], context: &TargetContext) -> Vec<String> {
    let mut seen = BTreeSet::new();
    paths
        .iter()
        .filter(|include| include.applies_to(context.engine_version))
        .filter(|include| seen.insert(include.path.as_str()))
        .map(|include| include.path.clone())
        .collect()
}
