//! Whole-plugin graph assembly
//!
//! Resolved modules are added one at a time; each is checked on its own for
//! visibility conflicts and self references. `finish` then checks the merged
//! edge set: unknown targets first, then cycles over public+private edges,
//! then a name-ordered topological sort.

use modplan_descriptor::Visibility;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{btree_map, BTreeMap, BTreeSet, BinaryHeap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::AssemblyError;
use crate::graph::DependencyGraph;
use crate::resolved::ResolvedModule;

/// What to do when one module names the same target in two visibility classes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisibilityPolicy {
    /// Report `ConflictingDependencyVisibility`
    #[default]
    Reject,
    /// Fold a public+private duplicate into public; dynamic duplicates still conflict
    PreferPublic,
}

impl VisibilityPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            VisibilityPolicy::Reject => "reject",
            VisibilityPolicy::PreferPublic => "prefer-public",
        }
    }
}

impl fmt::Display for VisibilityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisibilityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "reject" => Ok(VisibilityPolicy::Reject),
            "prefer-public" => Ok(VisibilityPolicy::PreferPublic),
            other => Err(format!(
                "Unknown visibility policy '{}': expected reject or prefer-public",
                other
            )),
        }
    }
}

const CONFLICT_PAIRS: [(Visibility, Visibility); 3] = [
    (Visibility::Public, Visibility::Private),
    (Visibility::Public, Visibility::Dynamic),
    (Visibility::Private, Visibility::Dynamic),
];

/// Per-module checks done before a module joins the graph
///
/// Rejects a module that references itself (reported as the one-module cycle
/// `[A, A]`, dynamic edges included) and one that lists a target under two
/// visibility classes, subject to `policy`.
pub fn check_module(
    mut module: ResolvedModule,
    policy: VisibilityPolicy,
) -> Result<ResolvedModule, AssemblyError> {
    if module.references(&module.name) {
        return Err(AssemblyError::CyclicDependency {
            path: vec![module.name.clone(), module.name.clone()],
        });
    }

    if policy == VisibilityPolicy::PreferPublic {
        let ResolvedModule {
            deps_public,
            deps_private,
            ..
        } = &mut module;
        deps_private.retain(|dep| {
            let shared = deps_public.contains(dep);
            if shared {
                debug!("Treating '{}' as a public dependency only", dep);
            }
            !shared
        });
    }

    for (first, second) in CONFLICT_PAIRS {
        if let Some(dependency) = module.deps(first).intersection(module.deps(second)).next() {
            return Err(AssemblyError::ConflictingDependencyVisibility {
                module: module.name.clone(),
                dependency: dependency.clone(),
                first,
                second,
            });
        }
    }

    Ok(module)
}

/// Incremental builder for a [`DependencyGraph`]; single-threaded
#[derive(Debug, Default)]
pub struct Assembler {
    policy: VisibilityPolicy,
    modules: BTreeMap<Arc<str>, ResolvedModule>,
}

impl Assembler {
    pub fn new(policy: VisibilityPolicy) -> Self {
        Assembler {
            policy,
            modules: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn add(&mut self, module: ResolvedModule) -> Result<(), AssemblyError> {
        let module = check_module(module, self.policy)?;
        match self.modules.entry(module.name.clone()) {
            btree_map::Entry::Occupied(_) => Err(AssemblyError::DuplicateModule(module.name)),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(module);
                Ok(())
            }
        }
    }

    /// Check the merged edge set and freeze it into a graph
    pub fn finish(self) -> Result<DependencyGraph, AssemblyError> {
        self.finish_excluding(&BTreeSet::new())
    }

    /// Like `finish`, but references to `failed` modules are not reported as
    /// unknown. Those modules were already rejected on their own; the result is
    /// only meaningful for surfacing further errors.
    pub(crate) fn finish_excluding(
        self,
        failed: &BTreeSet<Arc<str>>,
    ) -> Result<DependencyGraph, AssemblyError> {
        for module in self.modules.values() {
            let targets: BTreeSet<&Arc<str>> = module.edges().map(|(_, dep)| dep).collect();
            if let Some(missing) = targets
                .into_iter()
                .find(|dep| !self.modules.contains_key(*dep) && !failed.contains(*dep))
            {
                return Err(AssemblyError::UnknownModule {
                    missing: missing.clone(),
                    referenced_by: module.name.clone(),
                });
            }
        }

        if let Some(path) = find_cycle(&self.modules) {
            warn!("Cycle detected: {}", path.join(" -> "));
            return Err(AssemblyError::CyclicDependency { path });
        }

        let order = topological_order(&self.modules);
        let graph = DependencyGraph::freeze(self.modules, order);
        info!(
            "Assembled dependency graph: {} module(s), {} edge(s)",
            graph.len(),
            graph.edges().len()
        );
        Ok(graph)
    }
}

/// Assemble resolved modules with the default visibility policy
pub fn assemble(
    resolved_modules: impl IntoIterator<Item = ResolvedModule>,
) -> Result<DependencyGraph, AssemblyError> {
    assemble_with(resolved_modules, VisibilityPolicy::default())
}

pub fn assemble_with(
    resolved_modules: impl IntoIterator<Item = ResolvedModule>,
    policy: VisibilityPolicy,
) -> Result<DependencyGraph, AssemblyError> {
    let mut assembler = Assembler::new(policy);
    for module in resolved_modules {
        assembler.add(module)?;
    }
    assembler.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Depth-first search over public+private edges, roots in name order
fn find_cycle(modules: &BTreeMap<Arc<str>, ResolvedModule>) -> Option<Vec<Arc<str>>> {
    let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(modules.len());
    modules
        .keys()
        .find_map(|root| visit(root, modules, &mut marks))
}

/// Walks everything reachable from `root` using an explicit frame stack
fn visit<'a>(
    root: &'a Arc<str>,
    modules: &'a BTreeMap<Arc<str>, ResolvedModule>,
    marks: &mut HashMap<&'a str, Mark>,
) -> Option<Vec<Arc<str>>> {
    if marks.contains_key(root.as_ref()) {
        return None;
    }
    let module = modules.get(root)?;
    marks.insert(root.as_ref(), Mark::Visiting);

    // `path` and `frames` move together: path[i] owns frames[i]
    let mut path: Vec<&'a Arc<str>> = vec![root];
    let mut frames = vec![module.static_deps()];
    while let Some(deps) = frames.last_mut() {
        let Some(dep) = deps.next() else {
            frames.pop();
            if let Some(done) = path.pop() {
                marks.insert(done.as_ref(), Mark::Done);
            }
            continue;
        };
        match marks.get(dep.as_ref()) {
            Some(Mark::Done) => {}
            Some(Mark::Visiting) => {
                let start = path.iter().position(|m| *m == dep)?;
                let mut cycle: Vec<Arc<str>> = path[start..].iter().map(|m| Arc::clone(m)).collect();
                cycle.push(Arc::clone(dep));
                return Some(cycle);
            }
            None => {
                // Targets outside the graph only occur for modules already rejected
                if let Some(next) = modules.get(dep) {
                    marks.insert(dep.as_ref(), Mark::Visiting);
                    path.push(dep);
                    frames.push(next.static_deps());
                }
            }
        }
    }
    None
}

/// Kahn's algorithm over public+private edges; ready modules leave in name order
fn topological_order(modules: &BTreeMap<Arc<str>, ResolvedModule>) -> Vec<Arc<str>> {
    let mut pending: HashMap<&str, usize> = HashMap::with_capacity(modules.len());
    let mut dependents: HashMap<&str, Vec<&Arc<str>>> = HashMap::new();
    for (name, module) in modules {
        let mut count = 0;
        for dep in module.static_deps().filter(|dep| modules.contains_key(*dep)) {
            dependents.entry(dep.as_ref()).or_default().push(name);
            count += 1;
        }
        pending.insert(name.as_ref(), count);
    }

    let mut ready: BinaryHeap<Reverse<&Arc<str>>> = modules
        .keys()
        .filter(|name| pending.get(name.as_ref()) == Some(&0))
        .map(Reverse)
        .collect();

    let mut order = Vec::with_capacity(modules.len());
    while let Some(Reverse(name)) = ready.pop() {
        order.push(name.clone());
        for dependent in dependents.get(name.as_ref()).into_iter().flatten() {
            if let Some(count) = pending.get_mut(dependent.as_ref()) {
                *count -= 1;
                if *count == 0 {
                    ready.push(Reverse(*dependent));
                }
            }
        }
    }
    order
}
