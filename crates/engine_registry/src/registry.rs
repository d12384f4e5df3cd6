//! The component registry: storage, lifecycle, and per-entity reads.
//!
//! Component instances live in a primary store keyed by entity, then by kind,
//! each kind holding an insertion-ordered sequence. A secondary
//! [`KindIndex`] maps every kind to the entities holding it. Both structures
//! are updated together inside each mutating call, so a caller never
//! observes them out of step.

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use engine_component::{
    Component, ComponentMeta, ComponentRef, ComponentSource, ComponentTypeId, Entity, EntityId,
    downcast_component, same_instance,
};
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::index::KindIndex;
use crate::snapshot::ComponentMap;

/// Everything the registry stores for one entity.
#[derive(Debug)]
pub(crate) struct EntitySlot {
    /// Last-known handle, including the activity flag.
    pub(crate) entity: Entity,
    /// Kind to insertion-ordered instances. Sequences are never empty.
    pub(crate) components: BTreeMap<ComponentTypeId, Vec<ComponentRef>>,
}

/// Owns every component instance in the simulation.
///
/// Mutation takes `&mut self` and reads take `&self`, so the borrow checker
/// gives the single-writer / many-readers discipline the simulation needs.
/// Every value handed out is an owned snapshot (`Arc` handles in a fresh
/// `Vec`), which stays valid after the registry changes.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    pub(crate) config: RegistryConfig,
    pub(crate) entities: HashMap<EntityId, EntitySlot>,
    pub(crate) index: KindIndex,
    /// Kind table: the Rust type first stored under each kind id.
    pub(crate) kinds: HashMap<ComponentTypeId, ComponentMeta>,
    /// Total number of stored instances.
    pub(crate) len: usize,
}

impl ComponentRegistry {
    /// Create an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The configuration this registry was built with.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // -- Mutation --

    /// Attach `component` to `entity`, after any existing instances of the
    /// same kind.
    ///
    /// Returns the shared handle of the stored instance; that handle is the
    /// instance's identity for [`remove_component`](Self::remove_component).
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidEntity`] for the reserved id 0.
    /// - [`RegistryError::InactiveEntity`] if `entity` is inactive, or the
    ///   registry has recorded it as inactive.
    /// - [`RegistryError::InvalidComponent`] if validation is enabled and
    ///   `component.validate()` fails.
    /// - [`RegistryError::KindCollision`] if a different Rust type is already
    ///   stored under `T`'s kind id.
    ///
    /// On error nothing is stored.
    pub fn add_component<T: Component>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> Result<Arc<T>, RegistryError> {
        let id = entity.id();
        let meta = T::meta();

        if !id.is_valid() {
            warn!(kind = meta.name, "rejected component for the invalid entity id");
            return Err(RegistryError::InvalidEntity);
        }

        let known_inactive = self
            .entities
            .get(&id)
            .is_some_and(|slot| !slot.entity.is_active());
        if !entity.is_active() || known_inactive {
            warn!(entity = %id, kind = meta.name, "rejected component for inactive entity");
            return Err(RegistryError::InactiveEntity(id));
        }

        if self.config.validate_components && !component.validate() {
            warn!(entity = %id, kind = meta.name, "component failed validation");
            return Err(RegistryError::InvalidComponent {
                entity: id,
                kind: meta.name,
            });
        }

        match self.kinds.get(&meta.type_id) {
            Some(registered) if registered.rust_type != meta.rust_type => {
                warn!(kind = %meta.type_id, registered = registered.name, incoming = meta.name, "kind id collision");
                return Err(RegistryError::KindCollision {
                    kind: meta.type_id,
                    registered: registered.name,
                    incoming: meta.name,
                });
            }
            Some(_) => {}
            None => {
                self.kinds.insert(meta.type_id, meta);
            }
        }

        let shared = Arc::new(component);
        let slot = self.entities.entry(id).or_insert_with(|| EntitySlot {
            entity,
            components: BTreeMap::new(),
        });
        slot.entity = entity;
        slot.components
            .entry(meta.type_id)
            .or_default()
            .push(Arc::clone(&shared) as ComponentRef);
        self.index.insert(meta.type_id, id);
        self.len += 1;

        debug!(entity = %id, kind = meta.name, "component added");
        Ok(shared)
    }

    /// Remove one specific instance, matched by identity.
    ///
    /// Returns `false` if the instance is not stored on `entity`, including
    /// when it was already removed.
    pub fn remove_component<T: Component>(&mut self, entity: Entity, component: &Arc<T>) -> bool {
        let id = entity.id();
        let kind = T::component_type_id();
        let Some(position) = self
            .typed::<T>(id)
            .iter()
            .position(|stored| same_instance(stored, component))
        else {
            return false;
        };
        self.detach(id, kind, position).is_some()
    }

    /// Remove and return the `T` instance at `index` (0 is the primary one).
    ///
    /// Returns `None` if the entity, the kind, or the index is absent.
    pub fn remove_component_by_type<T: Component>(
        &mut self,
        entity: Entity,
        index: usize,
    ) -> Option<Arc<T>> {
        if !self.owns_kind::<T>() {
            return None;
        }
        let removed = self.detach(entity.id(), T::component_type_id(), index)?;
        downcast_component::<T>(&removed)
    }

    /// Remove and return every `T` instance on `entity`, in insertion order.
    pub fn remove_all_components_by_type<T: Component>(&mut self, entity: Entity) -> Vec<Arc<T>> {
        if !self.owns_kind::<T>() {
            return Vec::new();
        }
        self.take_sequence(entity.id(), T::component_type_id())
            .iter()
            .filter_map(downcast_component::<T>)
            .collect()
    }

    /// Remove every component from `entity` and forget the entity.
    ///
    /// Returns the removed sequences keyed by kind; empty if the entity was
    /// unknown.
    pub fn remove_entity_components(&mut self, entity: Entity) -> ComponentMap {
        let id = entity.id();
        let mut removed = ComponentMap::default();
        let Some(slot) = self.entities.remove(&id) else {
            return removed;
        };
        for (kind, sequence) in slot.components {
            self.index.remove(kind, id, sequence.len(), true);
            self.len -= sequence.len();
            removed.insert(kind, sequence);
        }
        debug!(entity = %id, components = removed.component_count(), "entity components removed");
        removed
    }

    /// Drop all entities, components, indices, and the kind table.
    ///
    /// The configuration is kept.
    pub fn clear(&mut self) {
        let dropped = self.len;
        self.entities.clear();
        self.index.clear();
        self.kinds.clear();
        self.len = 0;
        info!(components = dropped, "registry cleared");
    }

    /// Record a known entity's activity flag.
    ///
    /// Inactive entities cannot receive new components and, with
    /// [`RegistryConfig::skip_inactive`], are skipped by queries. Returns
    /// `false` if the entity has no components here.
    pub fn set_entity_active(&mut self, entity: Entity, active: bool) -> bool {
        let Some(slot) = self.entities.get_mut(&entity.id()) else {
            return false;
        };
        slot.entity = slot.entity.with_active(active);
        debug!(entity = %entity.id(), active, "entity activity updated");
        true
    }

    /// Mutate the `T` instance at `index`.
    ///
    /// `f` runs on a private copy. With
    /// [`RegistryConfig::validate_components`] the result must pass
    /// [`Component::validate`] before it replaces the stored value. If a
    /// snapshot still shares the instance, the stored value becomes a new
    /// instance, so snapshots taken earlier keep the old value; the returned
    /// handle is the instance's identity from then on.
    ///
    /// Returns `Ok(None)` if the entity, the kind, or the index is absent.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidComponent`] if the updated value fails
    /// validation. The stored instance is left as it was.
    pub fn update_component<T, F>(
        &mut self,
        entity: Entity,
        index: usize,
        f: F,
    ) -> Result<Option<Arc<T>>, RegistryError>
    where
        T: Component + Clone,
        F: FnOnce(&mut T),
    {
        let id = entity.id();
        if !self.owns_kind::<T>() {
            return Ok(None);
        }
        let validate = self.config.validate_components;
        let Some(stored) = self
            .entities
            .get_mut(&id)
            .and_then(|slot| slot.components.get_mut(&T::component_type_id()))
            .and_then(|sequence| sequence.get_mut(index))
        else {
            return Ok(None);
        };
        let Some(current) = stored.downcast_ref::<T>() else {
            return Ok(None);
        };

        let mut updated = current.clone();
        f(&mut updated);
        if validate && !updated.validate() {
            warn!(entity = %id, kind = T::type_name(), index, "update failed validation");
            return Err(RegistryError::InvalidComponent {
                entity: id,
                kind: T::type_name(),
            });
        }

        match Arc::get_mut(stored).and_then(|unshared| unshared.as_any_mut().downcast_mut::<T>()) {
            Some(value) => *value = updated,
            None => *stored = Arc::new(updated) as ComponentRef,
        }
        debug!(entity = %id, kind = T::type_name(), index, "component updated");
        Ok(downcast_component::<T>(stored))
    }

    // -- Reads --

    /// The `T` instance at `index`, or `None`.
    #[must_use]
    pub fn get_component<T: Component>(&self, entity: Entity, index: usize) -> Option<Arc<T>> {
        self.typed::<T>(entity.id())
            .get(index)
            .and_then(downcast_component::<T>)
    }

    /// Snapshot of every `T` instance on `entity`, possibly empty.
    #[must_use]
    pub fn get_components<T: Component>(&self, entity: Entity) -> Vec<Arc<T>> {
        self.typed::<T>(entity.id())
            .iter()
            .filter_map(downcast_component::<T>)
            .collect()
    }

    /// Returns `true` if `entity` holds at least one `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        !self.typed::<T>(entity.id()).is_empty()
    }

    /// Number of `T` instances on `entity`.
    #[must_use]
    pub fn get_component_count_by_type<T: Component>(&self, entity: Entity) -> usize {
        self.typed::<T>(entity.id()).len()
    }

    /// Snapshot of every sequence on `entity`, keyed by kind.
    #[must_use]
    pub fn get_components_for_entity(&self, entity: Entity) -> ComponentMap {
        let mut snapshot = ComponentMap::default();
        if let Some(slot) = self.entities.get(&entity.id()) {
            for (&kind, sequence) in &slot.components {
                snapshot.insert(kind, sequence.clone());
            }
        }
        snapshot
    }

    // -- Container protocol --

    /// Total number of stored component instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no component instance is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `entity` holds at least one component.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains_key(&entity.id())
    }

    /// Number of entities holding at least one component.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Metadata of the Rust type stored under `kind`, if any was stored since
    /// the last [`clear`](Self::clear).
    #[must_use]
    pub fn component_meta(&self, kind: ComponentTypeId) -> Option<&ComponentMeta> {
        self.kinds.get(&kind)
    }

    // -- Internals --

    /// Whether `T`'s kind id is unclaimed or claimed by `T` itself.
    ///
    /// Typed reads and removals treat a kind owned by another Rust type as
    /// absent.
    pub(crate) fn owns_kind<T: Component>(&self) -> bool {
        self.kinds
            .get(&T::component_type_id())
            .is_none_or(|meta| meta.rust_type == TypeId::of::<T>())
    }

    /// The stored `T` sequence on `id`, or an empty slice.
    fn typed<T: Component>(&self, id: EntityId) -> &[ComponentRef] {
        if self.owns_kind::<T>() {
            self.components_of(id, T::component_type_id())
        } else {
            &[]
        }
    }

    /// Whether queries should surface this slot.
    pub(crate) fn admits(&self, slot: &EntitySlot) -> bool {
        !self.config.skip_inactive || slot.entity.is_active()
    }

    /// Remove the instance at `position` and keep the index in step.
    fn detach(
        &mut self,
        id: EntityId,
        kind: ComponentTypeId,
        position: usize,
    ) -> Option<ComponentRef> {
        let slot = self.entities.get_mut(&id)?;
        let sequence = slot.components.get_mut(&kind)?;
        if position >= sequence.len() {
            return None;
        }
        let removed = sequence.remove(position);
        let emptied = sequence.is_empty();
        if emptied {
            slot.components.remove(&kind);
        }
        let entity_emptied = slot.components.is_empty();

        self.index.remove(kind, id, 1, emptied);
        self.len -= 1;
        if entity_emptied {
            self.entities.remove(&id);
        }
        debug!(entity = %id, kind = removed.kind_name(), position, "component removed");
        Some(removed)
    }

    /// Remove the whole `kind` sequence from `id`.
    fn take_sequence(&mut self, id: EntityId, kind: ComponentTypeId) -> Vec<ComponentRef> {
        let Some(slot) = self.entities.get_mut(&id) else {
            return Vec::new();
        };
        let Some(sequence) = slot.components.remove(&kind) else {
            return Vec::new();
        };
        let entity_emptied = slot.components.is_empty();

        self.index.remove(kind, id, sequence.len(), true);
        self.len -= sequence.len();
        if entity_emptied {
            self.entities.remove(&id);
        }
        debug!(entity = %id, kind = %kind, count = sequence.len(), "component sequence removed");
        sequence
    }
}

impl ComponentSource for ComponentRegistry {
    fn components_of(&self, entity: EntityId, kind: ComponentTypeId) -> &[ComponentRef] {
        self.entities
            .get(&entity)
            .and_then(|slot| slot.components.get(&kind))
            .map_or(&[][..], Vec::as_slice)
    }
}
