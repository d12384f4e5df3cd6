//! Counting and diagnostics.

use std::collections::BTreeSet;
use std::fmt;

use engine_component::{Component, ComponentTypeId, Entity};
use serde::{Deserialize, Serialize};

use crate::registry::ComponentRegistry;

/// Summary counts for logging and external tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Total stored component instances.
    pub components: usize,
    /// Kinds with at least one stored instance.
    pub kinds: usize,
    /// Entities holding at least one component.
    pub entities: usize,
}

impl fmt::Display for RegistryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ComponentRegistry(components={}, types={}, entities={})",
            self.components, self.kinds, self.entities
        )
    }
}

impl ComponentRegistry {
    /// Total `T` instances across all entities.
    #[must_use]
    pub fn get_component_count<T: Component>(&self) -> usize {
        if !self.owns_kind::<T>() {
            return 0;
        }
        self.component_count_of(T::component_type_id())
    }

    /// Total instances of `kind` across all entities.
    #[must_use]
    pub fn component_count_of(&self, kind: ComponentTypeId) -> usize {
        self.index.bucket(kind).map_or(0, |bucket| bucket.instances)
    }

    /// Total instances of every kind on `entity`.
    #[must_use]
    pub fn get_entity_component_count(&self, entity: Entity) -> usize {
        self.entities
            .get(&entity.id())
            .map_or(0, |slot| slot.components.values().map(Vec::len).sum())
    }

    /// Every kind with at least one stored instance.
    #[must_use]
    pub fn get_all_component_types(&self) -> BTreeSet<ComponentTypeId> {
        self.index.iter().map(|(kind, _)| kind).collect()
    }

    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            components: self.len,
            kinds: self.index.kind_count(),
            entities: self.entities.len(),
        }
    }
}

impl fmt::Display for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.stats(), f)
    }
}
