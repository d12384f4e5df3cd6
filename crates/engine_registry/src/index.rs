//! The per-kind secondary index.
//!
//! Maps each component kind to the set of entities holding at least one
//! instance of it, plus the kind's total instance count. Buckets are ordered
//! sets, so every query sourced from the index visits entities in ascending
//! [`EntityId`] order.

use std::collections::{BTreeSet, HashMap};

use engine_component::{ComponentTypeId, EntityId};

/// Entities holding one kind, and how many instances of it exist in total.
#[derive(Debug, Clone, Default)]
pub(crate) struct KindBucket {
    pub(crate) entities: BTreeSet<EntityId>,
    pub(crate) instances: usize,
}

#[derive(Debug, Default)]
pub(crate) struct KindIndex {
    buckets: HashMap<ComponentTypeId, KindBucket>,
}

impl KindIndex {
    /// Record one new instance of `kind` on `entity`.
    pub(crate) fn insert(&mut self, kind: ComponentTypeId, entity: EntityId) {
        let bucket = self.buckets.entry(kind).or_default();
        bucket.entities.insert(entity);
        bucket.instances += 1;
    }

    /// Record `count` instances of `kind` leaving `entity`.
    ///
    /// `emptied` is `true` when the entity has no `kind` instances left, in
    /// which case it leaves the bucket. An empty bucket is dropped.
    pub(crate) fn remove(
        &mut self,
        kind: ComponentTypeId,
        entity: EntityId,
        count: usize,
        emptied: bool,
    ) {
        let Some(bucket) = self.buckets.get_mut(&kind) else {
            return;
        };
        bucket.instances = bucket.instances.saturating_sub(count);
        if emptied {
            bucket.entities.remove(&entity);
        }
        if bucket.entities.is_empty() {
            self.buckets.remove(&kind);
        }
    }

    pub(crate) fn bucket(&self, kind: ComponentTypeId) -> Option<&KindBucket> {
        self.buckets.get(&kind)
    }

    pub(crate) fn contains(&self, kind: ComponentTypeId, entity: EntityId) -> bool {
        self.buckets
            .get(&kind)
            .is_some_and(|bucket| bucket.entities.contains(&entity))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (ComponentTypeId, &KindBucket)> {
        self.buckets.iter().map(|(&kind, bucket)| (kind, bucket))
    }

    pub(crate) fn kind_count(&self) -> usize {
        self.buckets.len()
    }

    /// The requested kind whose bucket has the fewest entities.
    ///
    /// Returns `None` if `kinds` is empty or any kind has no bucket at all,
    /// since then no entity can satisfy every kind.
    pub(crate) fn smallest(&self, kinds: &[ComponentTypeId]) -> Option<ComponentTypeId> {
        let mut best: Option<(ComponentTypeId, usize)> = None;
        for &kind in kinds {
            let size = self.buckets.get(&kind)?.entities.len();
            if best.is_none_or(|(_, best_size)| size < best_size) {
                best = Some((kind, size));
            }
        }
        best.map(|(kind, _)| kind)
    }

    pub(crate) fn clear(&mut self) {
        self.buckets.clear();
    }

    #[cfg(test)]
    pub(crate) fn bucket_mut(&mut self, kind: ComponentTypeId) -> Option<&mut KindBucket> {
        self.buckets.get_mut(&kind)
    }
}
