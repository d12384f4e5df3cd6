//! The query engine.
//!
//! Every query is sourced from the kind index, never from a scan over all
//! entities. Multi-kind queries pick the requested kind with the fewest
//! entities, walk its bucket, and keep only entities present in every other
//! requested bucket.
//!
//! Results are yielded lazily in ascending [`EntityId`] order. Each iterator
//! borrows the registry, so the registry cannot change while a query is in
//! flight; every yielded value is an owned snapshot that outlives it.

use std::collections::btree_set;
use std::marker::PhantomData;
use std::sync::Arc;

use engine_component::query::snapshot_of;
use engine_component::{Component, ComponentTypeId, Entity, EntityId, QueryKinds};
use tracing::trace;

use crate::registry::{ComponentRegistry, EntitySlot};
use crate::snapshot::ComponentMap;

/// Slots holding every requested kind.
struct Candidates<'r> {
    registry: &'r ComponentRegistry,
    /// The smallest requested bucket; `None` if no entity can match.
    source: Option<btree_set::Iter<'r, EntityId>>,
    /// The requested kinds other than the one `source` walks.
    others: Vec<ComponentTypeId>,
}

impl<'r> Candidates<'r> {
    fn new(registry: &'r ComponentRegistry, kinds: &[ComponentTypeId]) -> Self {
        let mut kinds = kinds.to_vec();
        kinds.sort_unstable();
        kinds.dedup();

        let pivot = registry.index.smallest(&kinds);
        let source = pivot
            .and_then(|kind| registry.index.bucket(kind))
            .map(|bucket| bucket.entities.iter());
        kinds.retain(|&kind| Some(kind) != pivot);

        trace!(
            pivot = ?pivot,
            others = kinds.len(),
            candidates = source.as_ref().map_or(0, |it| it.len()),
            "query planned"
        );
        Self {
            registry,
            source,
            others: kinds,
        }
    }
}

impl<'r> Iterator for Candidates<'r> {
    type Item = &'r EntitySlot;

    fn next(&mut self) -> Option<Self::Item> {
        let source = self.source.as_mut()?;
        for id in source.by_ref() {
            if !self
                .others
                .iter()
                .all(|&kind| self.registry.index.contains(kind, *id))
            {
                continue;
            }
            let Some(slot) = self.registry.entities.get(id) else {
                continue;
            };
            if self.registry.admits(slot) {
                return Some(slot);
            }
        }
        None
    }
}

/// Iterator returned by [`ComponentRegistry::get_entities_with_component`].
pub struct EntitiesWithComponent<'r, T> {
    candidates: Candidates<'r>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Component> Iterator for EntitiesWithComponent<'_, T> {
    type Item = (Entity, Vec<Arc<T>>);

    fn next(&mut self) -> Option<Self::Item> {
        let registry = self.candidates.registry;
        self.candidates.find_map(|slot| {
            let id = slot.entity.id();
            snapshot_of::<T, _>(registry, id).map(|snapshot| (slot.entity, snapshot))
        })
    }
}

/// Iterator returned by [`ComponentRegistry::get_entities_with_kinds`].
pub struct EntitiesWithKinds<'r> {
    candidates: Candidates<'r>,
    kinds: Vec<ComponentTypeId>,
}

impl Iterator for EntitiesWithKinds<'_> {
    type Item = (Entity, ComponentMap);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.candidates.next()?;
        let mut snapshot = ComponentMap::default();
        for kind in &self.kinds {
            if let Some(sequence) = slot.components.get(kind) {
                snapshot.insert(*kind, sequence.clone());
            }
        }
        Some((slot.entity, snapshot))
    }
}

/// Iterator returned by [`ComponentRegistry::get_entities_with_components`].
pub struct EntitiesWithComponents<'r, Q> {
    candidates: Candidates<'r>,
    _marker: PhantomData<fn() -> Q>,
}

impl<Q: QueryKinds> Iterator for EntitiesWithComponents<'_, Q> {
    type Item = (Entity, Q::Snapshots);

    fn next(&mut self) -> Option<Self::Item> {
        let registry = self.candidates.registry;
        self.candidates.find_map(|slot| {
            Q::snapshots(registry, slot.entity.id()).map(|snapshots| (slot.entity, snapshots))
        })
    }
}

/// Iterator returned by
/// [`ComponentRegistry::get_entities_with_single_components`].
pub struct EntitiesWithSingleComponents<'r, Q> {
    candidates: Candidates<'r>,
    _marker: PhantomData<fn() -> Q>,
}

impl<Q: QueryKinds> Iterator for EntitiesWithSingleComponents<'_, Q> {
    type Item = (Entity, Q::Primary);

    fn next(&mut self) -> Option<Self::Item> {
        let registry = self.candidates.registry;
        self.candidates.find_map(|slot| {
            Q::primary(registry, slot.entity.id()).map(|primary| (slot.entity, primary))
        })
    }
}

impl ComponentRegistry {
    /// Every entity holding at least one `T`, with a snapshot of its `T`
    /// sequence.
    pub fn get_entities_with_component<T: Component>(&self) -> EntitiesWithComponent<'_, T> {
        EntitiesWithComponent {
            candidates: Candidates::new(self, &[T::component_type_id()]),
            _marker: PhantomData,
        }
    }

    /// Every entity holding all kinds in `Q`, with one snapshot per kind.
    ///
    /// ```rust
    /// # use engine_component::{Component, Entity};
    /// # use engine_registry::ComponentRegistry;
    /// #[derive(Debug)]
    /// struct Position(f32, f32);
    /// impl Component for Position { fn type_name() -> &'static str { "Position" } }
    ///
    /// #[derive(Debug)]
    /// struct Weapon(&'static str);
    /// impl Component for Weapon { fn type_name() -> &'static str { "Weapon" } }
    ///
    /// let mut registry = ComponentRegistry::new();
    /// let player = Entity::from_raw(1);
    /// registry.add_component(player, Position(0.0, 0.0)).unwrap();
    /// registry.add_component(player, Weapon("soccer_ball")).unwrap();
    /// registry.add_component(player, Weapon("basketball")).unwrap();
    ///
    /// for (entity, (positions, weapons)) in registry.get_entities_with_components::<(Position, Weapon)>() {
    ///     assert_eq!(entity, player);
    ///     assert_eq!(positions.len(), 1);
    ///     assert_eq!(weapons.len(), 2);
    /// }
    /// ```
    pub fn get_entities_with_components<Q: QueryKinds>(&self) -> EntitiesWithComponents<'_, Q> {
        EntitiesWithComponents {
            candidates: Candidates::new(self, &Q::kinds()),
            _marker: PhantomData,
        }
    }

    /// Dynamic form of [`get_entities_with_components`](Self::get_entities_with_components)
    /// over kind ids. An empty `kinds` slice matches nothing.
    pub fn get_entities_with_kinds(&self, kinds: &[ComponentTypeId]) -> EntitiesWithKinds<'_> {
        EntitiesWithKinds {
            candidates: Candidates::new(self, kinds),
            kinds: kinds.to_vec(),
        }
    }

    /// Every entity holding all kinds in `Q`, with the primary (index 0)
    /// instance of each kind.
    ///
    /// Entities holding several instances of a kind are still matched, but
    /// only the first instance is surfaced.
    pub fn get_entities_with_single_components<Q: QueryKinds>(
        &self,
    ) -> EntitiesWithSingleComponents<'_, Q> {
        EntitiesWithSingleComponents {
            candidates: Candidates::new(self, &Q::kinds()),
            _marker: PhantomData,
        }
    }
}
