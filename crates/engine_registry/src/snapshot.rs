//! Owned, point-in-time copies of registry contents.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::sync::Arc;

use engine_component::{Component, ComponentRef, ComponentTypeId, downcast_component};

/// A snapshot of several kinds' component sequences, keyed by kind.
///
/// Returned by per-entity reads, whole-entity removal, and dynamic multi-kind
/// queries. The map owns its sequences: later registry mutation does not
/// change it, and changing it does not touch the registry.
#[derive(Debug, Clone, Default)]
pub struct ComponentMap {
    sequences: BTreeMap<ComponentTypeId, Vec<ComponentRef>>,
}

impl ComponentMap {
    pub(crate) fn insert(&mut self, kind: ComponentTypeId, sequence: Vec<ComponentRef>) {
        self.sequences.insert(kind, sequence);
    }

    /// Typed copy of the `T` sequence, empty if `T` is absent.
    #[must_use]
    pub fn get<T: Component>(&self) -> Vec<Arc<T>> {
        self.get_kind(T::component_type_id())
            .iter()
            .filter_map(downcast_component::<T>)
            .collect()
    }

    /// The erased sequence for `kind`, empty if absent.
    #[must_use]
    pub fn get_kind(&self, kind: ComponentTypeId) -> &[ComponentRef] {
        self.sequences.get(&kind).map_or(&[][..], Vec::as_slice)
    }

    #[must_use]
    pub fn contains_kind(&self, kind: ComponentTypeId) -> bool {
        self.sequences.contains_key(&kind)
    }

    /// The kinds present, in ascending id order.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.sequences.keys().copied()
    }

    /// Number of kinds in the snapshot.
    #[must_use]
    pub fn kind_count(&self) -> usize {
        self.sequences.len()
    }

    /// Total number of component instances across all kinds.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.sequences.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ComponentTypeId, Vec<ComponentRef>> {
        self.sequences.iter()
    }
}

impl IntoIterator for ComponentMap {
    type Item = (ComponentTypeId, Vec<ComponentRef>);
    type IntoIter = btree_map::IntoIter<ComponentTypeId, Vec<ComponentRef>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sequences.into_iter()
    }
}

impl<'a> IntoIterator for &'a ComponentMap {
    type Item = (&'a ComponentTypeId, &'a Vec<ComponentRef>);
    type IntoIter = btree_map::Iter<'a, ComponentTypeId, Vec<ComponentRef>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sequences.iter()
    }
}
