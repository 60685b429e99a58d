use modplan_descriptor::{PchUsage, TargetType, Visibility};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A descriptor with every version condition evaluated for one target context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedModule {
    pub name: Arc<str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_restriction: Option<TargetType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pch_usage: Option<PchUsage>,
    pub include_paths_public: Vec<String>,
    pub include_paths_private: Vec<String>,
    pub deps_public: BTreeSet<Arc<str>>,
    pub deps_private: BTreeSet<Arc<str>>,
    pub deps_dynamic: BTreeSet<Arc<str>>,
}

impl ResolvedModule {
    /// Module with no dependencies and no include paths
    pub fn leaf(name: impl Into<Arc<str>>) -> Self {
        ResolvedModule {
            name: name.into(),
            external: false,
            target_restriction: None,
            pch_usage: None,
            include_paths_public: Vec::new(),
            include_paths_private: Vec::new(),
            deps_public: BTreeSet::new(),
            deps_private: BTreeSet::new(),
            deps_dynamic: BTreeSet::new(),
        }
    }

    pub fn deps(&self, visibility: Visibility) -> &BTreeSet<Arc<str>> {
        match visibility {
            Visibility::Public => &self.deps_public,
            Visibility::Private => &self.deps_private,
            Visibility::Dynamic => &self.deps_dynamic,
        }
    }

    pub(crate) fn deps_mut(&mut self, visibility: Visibility) -> &mut BTreeSet<Arc<str>> {
        match visibility {
            Visibility::Public => &mut self.deps_public,
            Visibility::Private => &mut self.deps_private,
            Visibility::Dynamic => &mut self.deps_dynamic,
        }
    }

    /// Link-time dependencies: public then private
    pub fn static_deps(&self) -> impl Iterator<Item = &Arc<str>> {
        Visibility::ALL
            .into_iter()
            .filter(|visibility| visibility.is_static())
            .flat_map(move |visibility| self.deps(visibility).iter())
    }

    /// Every edge of this module tagged with its visibility class
    pub fn edges(&self) -> impl Iterator<Item = (Visibility, &Arc<str>)> {
        Visibility::ALL
            .into_iter()
            .flat_map(move |visibility| self.deps(visibility).iter().map(move |dep| (visibility, dep)))
    }

    /// Whether the module references `name` in any class
    pub fn references(&self, name: &str) -> bool {
        Visibility::ALL
            .into_iter()
            .any(|visibility| self.deps(visibility).contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_deps_skip_dynamic_edges() {
        let mut module = ResolvedModule::leaf("Editor");
        module.deps_mut(Visibility::Public).insert(Arc::from("Engine"));
        module.deps_mut(Visibility::Private).insert(Arc::from("Core"));
        module.deps_mut(Visibility::Dynamic).insert(Arc::from("HotReload"));

        let deps: Vec<&str> = module.static_deps().map(|m| m.as_ref()).collect();
        assert_eq!(deps, vec!["Engine", "Core"]);
        assert_eq!(module.edges().count(), 3);
    }
}
