//! Explicit name -> descriptor mapping for one resolution invocation

use std::collections::btree_map::{self, BTreeMap};
use std::sync::Arc;
use tracing::debug;

use crate::errors::DescriptorError;
use crate::types::{DescriptorDocument, ModuleDescriptor};

/// Every module known to one invocation, keyed and iterated by name
///
/// Declared names are unique. External (engine-provided) names may be listed
/// by several documents and collapse into one leaf module.
#[derive(Debug, Clone, Default)]
pub struct ModuleSet {
    modules: BTreeMap<Arc<str>, ModuleDescriptor>,
}

impl ModuleSet {
    pub fn new() -> Self {
        ModuleSet::default()
    }

    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = ModuleDescriptor>,
    ) -> Result<Self, DescriptorError> {
        let mut set = ModuleSet::new();
        for descriptor in descriptors {
            set.insert(descriptor)?;
        }
        Ok(set)
    }

    /// Insert a descriptor, rejecting a name that is already known
    pub fn insert(&mut self, descriptor: ModuleDescriptor) -> Result<(), DescriptorError> {
        match self.modules.entry(descriptor.name.clone()) {
            btree_map::Entry::Occupied(existing) => {
                if existing.get().external && descriptor.external {
                    return Ok(());
                }
                Err(DescriptorError::DuplicateModule(descriptor.name))
            }
            btree_map::Entry::Vacant(slot) => {
                slot.insert(descriptor);
                Ok(())
            }
        }
    }

    pub fn add_external(&mut self, name: impl Into<Arc<str>>) -> Result<(), DescriptorError> {
        self.insert(ModuleDescriptor::external(name))
    }

    /// Merge a parsed document into the set
    pub fn extend_from_document(&mut self, document: DescriptorDocument) -> Result<(), DescriptorError> {
        debug!(
            "Merging document with {} module(s) and {} external name(s)",
            document.modules.len(),
            document.external.modules.len()
        );
        for name in document.external.modules {
            self.add_external(name)?;
        }
        for descriptor in document.modules {
            self.insert(descriptor)?;
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
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

    /// All descriptors in ascending name order
    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.values()
    }

    /// Descriptors declared by the plugin, skipping engine-provided leaves
    pub fn declared(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.values().filter(|descriptor| !descriptor.external)
    }

    pub fn external_count(&self) -> usize {
        self.modules.values().filter(|descriptor| descriptor.external).count()
    }
}
