//! Typed query tuples.
//!
//! A [`QueryKinds`] implementation describes a set of component kinds a
//! caller wants together, e.g. `(Position, Velocity)`. It knows the kind ids
//! to intersect on, and how to pull typed snapshots for one entity out of any
//! [`ComponentSource`].

use std::sync::Arc;

use crate::component::{Component, ComponentRef, ComponentTypeId, downcast_component};
use crate::entity::EntityId;

/// Read access to stored component sequences, keyed by entity and kind.
///
/// Sequences are in insertion order; index 0 is the primary instance.
pub trait ComponentSource {
    /// All instances of `kind` on `entity`, or an empty slice.
    fn components_of(&self, entity: EntityId, kind: ComponentTypeId) -> &[ComponentRef];
}

/// Collect every instance of `T` on `entity` into an owned snapshot.
///
/// Returns `None` if the entity holds no `T`, or if the instances filed under
/// `T`'s kind id belong to another Rust type.
pub fn snapshot_of<T: Component, S: ComponentSource + ?Sized>(
    source: &S,
    entity: EntityId,
) -> Option<Vec<Arc<T>>> {
    let stored = source.components_of(entity, T::component_type_id());
    if stored.is_empty() {
        return None;
    }
    stored.iter().map(downcast_component::<T>).collect()
}

/// The primary (index 0) instance of `T` on `entity`.
pub fn primary_of<T: Component, S: ComponentSource + ?Sized>(
    source: &S,
    entity: EntityId,
) -> Option<Arc<T>> {
    source
        .components_of(entity, T::component_type_id())
        .first()
        .and_then(downcast_component::<T>)
}

/// A tuple of component types queried together.
///
/// Implemented for tuples of one to eight [`Component`] types.
pub trait QueryKinds {
    /// One snapshot per kind: `(Vec<Arc<A>>, Vec<Arc<B>>, ...)`.
    type Snapshots;
    /// The primary instance per kind: `(Arc<A>, Arc<B>, ...)`.
    type Primary;

    /// The kind ids in tuple order. May contain duplicates.
    fn kinds() -> Vec<ComponentTypeId>;

    /// Snapshots of every requested kind, or `None` if any kind is missing.
    fn snapshots<S: ComponentSource + ?Sized>(source: &S, entity: EntityId)
    -> Option<Self::Snapshots>;

    /// Primary instances of every requested kind, or `None` if any kind is
    /// missing. Extra instances beyond index 0 are not surfaced.
    fn primary<S: ComponentSource + ?Sized>(source: &S, entity: EntityId) -> Option<Self::Primary>;
}

macro_rules! impl_query_kinds {
    ($($name:ident),+) => {
        impl<$($name: Component),+> QueryKinds for ($($name,)+) {
            type Snapshots = ($(Vec<Arc<$name>>,)+);
            type Primary = ($(Arc<$name>,)+);

            fn kinds() -> Vec<ComponentTypeId> {
                vec![$(<$name as Component>::component_type_id()),+]
            }

            fn snapshots<S: ComponentSource + ?Sized>(
                source: &S,
                entity: EntityId,
            ) -> Option<Self::Snapshots> {
                Some(($(snapshot_of::<$name, S>(source, entity)?,)+))
            }

            fn primary<S: ComponentSource + ?Sized>(
                source: &S,
                entity: EntityId,
            ) -> Option<Self::Primary> {
                Some(($(primary_of::<$name, S>(source, entity)?,)+))
            }
        }
    };
}

impl_query_kinds!(A);
impl_query_kinds!(A, B);
impl_query_kinds!(A, B, C);
impl_query_kinds!(A, B, C, D);
impl_query_kinds!(A, B, C, D, E);
impl_query_kinds!(A, B, C, D, E, F);
impl_query_kinds!(A, B, C, D, E, F, G);
impl_query_kinds!(A, B, C, D, E, F, G, H);
