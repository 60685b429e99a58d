//! End-to-end resolution of a module set
//!
//! Per-module work (target gating, version resolution, visibility checks) is
//! independent and runs on the rayon pool in aggregate mode. Graph assembly is
//! a single sequential pass over the survivors.

use modplan_descriptor::{ModuleDescriptor, ModuleSet, PchUsage, TargetContext, TargetType};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::assembler::{check_module, Assembler, VisibilityPolicy};
use crate::errors::{PlanError, ResolveError};
use crate::graph::DependencyGraph;
use crate::resolved::ResolvedModule;
use crate::validator::validate;
use crate::version::resolve;

/// How many errors one pass reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMode {
    /// Keep going after a module fails and report everything found
    #[default]
    Aggregate,
    /// Stop at the first error, checking modules in name order
    FailFast,
}

impl ResolutionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionMode::Aggregate => "aggregate",
            ResolutionMode::FailFast => "fail-fast",
        }
    }
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "aggregate" => Ok(ResolutionMode::Aggregate),
            "fail-fast" => Ok(ResolutionMode::FailFast),
            other => Err(format!(
                "Unknown resolution mode '{}': expected aggregate or fail-fast",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOptions {
    pub mode: ResolutionMode,
    pub visibility: VisibilityPolicy,
}

/// Outcome of the per-module phase, in module name order
#[derive(Debug, Default)]
pub struct ModuleResults {
    pub resolved: Vec<ResolvedModule>,
    pub errors: Vec<ResolveError>,
}

impl ModuleResults {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Names of the modules that failed on their own
    pub fn failed_modules(&self) -> BTreeSet<Arc<str>> {
        self.errors.iter().map(|err| Arc::from(err.module())).collect()
    }
}

impl FromIterator<Result<ResolvedModule, ResolveError>> for ModuleResults {
    fn from_iter<T: IntoIterator<Item = Result<ResolvedModule, ResolveError>>>(iter: T) -> Self {
        iter.into_iter().fold(ModuleResults::default(), |mut acc, item| {
            match item {
                Ok(module) => acc.resolved.push(module),
                Err(err) => acc.errors.push(err),
            }
            acc
        })
    }
}

fn process_module(
    descriptor: &ModuleDescriptor,
    context: &TargetContext,
    policy: VisibilityPolicy,
) -> Result<ResolvedModule, ResolveError> {
    validate(descriptor, context)?;
    let resolved = resolve(descriptor, context);
    Ok(check_module(resolved, policy)?)
}

/// Validate, resolve and check every module without assembling a graph
pub fn resolve_modules(
    set: &ModuleSet,
    context: &TargetContext,
    options: PlanOptions,
) -> ModuleResults {
    match options.mode {
        ResolutionMode::FailFast => {
            let mut results = ModuleResults::default();
            for descriptor in set.iter() {
                match process_module(descriptor, context, options.visibility) {
                    Ok(module) => results.resolved.push(module),
                    Err(err) => {
                        debug!("Stopping at first error: {}", err);
                        results.errors.push(err);
                        break;
                    }
                }
            }
            results
        }
        ResolutionMode::Aggregate => {
            let descriptors: Vec<&ModuleDescriptor> = set.iter().collect();
            let outcomes: Vec<Result<ResolvedModule, ResolveError>> = descriptors
                .par_iter()
                .map(|descriptor| process_module(descriptor, context, options.visibility))
                .collect();
            outcomes.into_iter().collect()
        }
    }
}

/// Resolve a module set into a dependency graph for one target context
///
/// In aggregate mode modules that fail on their own are left out, the rest
/// are still assembled, and every error found is returned together. In
/// fail-fast mode the first error ends the pass.
pub fn plan(
    set: &ModuleSet,
    context: &TargetContext,
    options: PlanOptions,
) -> Result<DependencyGraph, PlanError> {
    let start = Instant::now();
    info!(
        "Resolving {} module(s) for {} ({} mode)",
        set.len(),
        context,
        options.mode
    );

    let results = resolve_modules(set, context, options);
    if !results.is_clean() && options.mode == ResolutionMode::FailFast {
        return Err(PlanError::new(results.errors));
    }

    let failed = results.failed_modules();
    let mut errors = results.errors;
    let mut assembler = Assembler::new(options.visibility);
    for module in results.resolved {
        if let Err(err) = assembler.add(module) {
            if options.mode == ResolutionMode::FailFast {
                return Err(PlanError::single(err));
            }
            errors.push(err.into());
        }
    }

    let outcome = assembler.finish_excluding(&failed);
    debug!("Resolution took {:?}", start.elapsed());
    match outcome {
        Ok(graph) if errors.is_empty() => Ok(graph),
        Ok(_) => Err(PlanError::new(errors)),
        Err(err) => {
            errors.push(err.into());
            Err(PlanError::new(errors))
        }
    }
}

/// Serializable per-module build instructions, in build order
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    pub target: TargetContext,
    pub build_order: Vec<Arc<str>>,
    pub modules: Vec<PlannedModule>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedModule {
    pub name: Arc<str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_restriction: Option<TargetType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pch_usage: Option<PchUsage>,
    pub include_paths_public: Vec<String>,
    pub include_paths_private: Vec<String>,
    pub public: Vec<Arc<str>>,
    pub private: Vec<Arc<str>>,
    pub dynamic: Vec<Arc<str>>,
    /// Modules whose headers this module can include
    pub visible: Vec<Arc<str>>,
}

impl BuildPlan {
    pub fn from_graph(graph: &DependencyGraph, context: TargetContext) -> Self {
        let modules = graph
            .iter_build_order()
            .map(|module| PlannedModule {
                name: module.name.clone(),
                external: module.external,
                target_restriction: module.target_restriction,
                pch_usage: module.pch_usage,
                include_paths_public: module.include_paths_public.clone(),
                include_paths_private: module.include_paths_private.clone(),
                public: module.deps_public.iter().cloned().collect(),
                private: module.deps_private.iter().cloned().collect(),
                dynamic: module.deps_dynamic.iter().cloned().collect(),
                visible: graph
                    .visible_modules(&module.name)
                    .map(|set| set.into_iter().collect())
                    .unwrap_or_default(),
            })
            .collect();

        BuildPlan {
            target: context,
            build_order: graph.build_order().to_vec(),
            modules,
        }
    }

    pub fn get(&self, name: &str) -> Option<&PlannedModule> {
        self.modules.iter().find(|module| module.name.as_ref() == name)
    }
}
