//! Frozen dependency graph produced by the assembler

use modplan_descriptor::Visibility;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use crate::resolved::ResolvedModule;

/// One dependency edge: `from` depends on `to`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Edge {
    pub from: Arc<str>,
    pub to: Arc<str>,
    pub visibility: Visibility,
}

/// Acyclic module graph with a fixed build order
///
/// Only the assembler builds one; after that it is read-only. Every edge
/// target is a node and public+private edges form no cycle.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    modules: BTreeMap<Arc<str>, ResolvedModule>,
    dependents: BTreeMap<Arc<str>, BTreeSet<(Arc<str>, Visibility)>>,
    order: Vec<Arc<str>>,
}

impl DependencyGraph {
    pub(crate) fn freeze(modules: BTreeMap<Arc<str>, ResolvedModule>, order: Vec<Arc<str>>) -> Self {
        let mut dependents: BTreeMap<Arc<str>, BTreeSet<(Arc<str>, Visibility)>> = BTreeMap::new();
        for (name, module) in &modules {
            for (visibility, dep) in module.edges() {
                dependents
                    .entry(dep.clone())
                    .or_default()
                    .insert((name.clone(), visibility));
            }
        }
        DependencyGraph {
            modules,
            dependents,
            order,
        }
    }

    /// Modules in build order: every module follows its public and private dependencies
    pub fn build_order(&self) -> &[Arc<str>] {
        &self.order
    }

    /// Index of `name` in the build order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|m| m.as_ref() == name)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&ResolvedModule> {
        self.modules.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Modules in ascending name order
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedModule> {
        self.modules.values()
    }

    /// Modules in build order
    pub fn iter_build_order(&self) -> impl Iterator<Item = &ResolvedModule> {
        self.order.iter().filter_map(|name| self.modules.get(name))
    }

    /// All edges, sorted by source, target, then visibility
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .modules
            .values()
            .flat_map(|module| {
                module.edges().map(|(visibility, dep)| Edge {
                    from: module.name.clone(),
                    to: dep.clone(),
                    visibility,
                })
            })
            .collect();
        edges.sort();
        edges
    }

    /// Modules depending on `name`, with the visibility of each edge
    pub fn dependents_of(&self, name: &str) -> Vec<(Arc<str>, Visibility)> {
        self.dependents
            .get(name)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Modules whose interface `name` can see at compile time
    ///
    /// That is every direct public or private dependency, plus everything
    /// those re-export through public edges, transitively. Dynamic edges
    /// contribute nothing.
    pub fn visible_modules(&self, name: &str) -> Option<BTreeSet<Arc<str>>> {
        let module = self.modules.get(name)?;
        let mut visible = BTreeSet::new();
        let mut queue: VecDeque<&Arc<str>> = module.static_deps().collect();
        while let Some(dep) = queue.pop_front() {
            if !visible.insert(dep.clone()) {
                continue;
            }
            if let Some(next) = self.modules.get(dep) {
                queue.extend(next.deps_public.iter());
            }
        }
        Some(visible)
    }
}
