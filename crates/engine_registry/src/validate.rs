//! Consistency checks between the primary store and the kind index.
//!
//! None of this runs on the hot path. A registry driven only through its
//! public API never fails these checks; a failure means a registry bug.

use engine_component::{ComponentTypeId, EntityId};
use tracing::warn;

use crate::registry::ComponentRegistry;

/// The first broken invariant found by
/// [`ComponentRegistry::find_inconsistency`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Inconsistency {
    #[error("entity {key} is stored under the key of entity {entity}")]
    SlotKeyMismatch { key: EntityId, entity: EntityId },

    #[error("entity {0} is stored with no components")]
    EmptyEntity(EntityId),

    #[error("entity {entity} has an empty sequence for kind {kind}")]
    EmptySequence {
        entity: EntityId,
        kind: ComponentTypeId,
    },

    #[error("entity {entity} files a {found} instance under kind {kind}")]
    MisfiledComponent {
        entity: EntityId,
        kind: ComponentTypeId,
        found: ComponentTypeId,
    },

    #[error("entity {entity} holds kind {kind} but is missing from its index bucket")]
    MissingFromIndex {
        entity: EntityId,
        kind: ComponentTypeId,
    },

    #[error("index bucket for kind {kind} lists entity {entity}, which holds none")]
    StaleIndexEntry {
        entity: EntityId,
        kind: ComponentTypeId,
    },

    #[error("index bucket for kind {0} is empty")]
    EmptyBucket(ComponentTypeId),

    #[error("index counts {indexed} instances of kind {kind}, store holds {stored}")]
    InstanceCountMismatch {
        kind: ComponentTypeId,
        indexed: usize,
        stored: usize,
    },

    #[error("kind {0} is indexed but was never registered")]
    UnknownKind(ComponentTypeId),

    #[error("registry records {recorded} components, store holds {actual}")]
    LengthMismatch { recorded: usize, actual: usize },
}

impl ComponentRegistry {
    /// Returns `true` if the primary store, kind index, kind table, and
    /// recorded length all agree.
    ///
    /// Any violation is logged at `warn` level.
    #[must_use]
    pub fn validate_registry(&self) -> bool {
        match self.find_inconsistency() {
            None => true,
            Some(problem) => {
                warn!(%problem, "registry inconsistency detected");
                false
            }
        }
    }

    /// Walk both storage structures and report the first broken invariant.
    #[must_use]
    pub fn find_inconsistency(&self) -> Option<Inconsistency> {
        let mut total = 0;

        for (&id, slot) in &self.entities {
            if slot.entity.id() != id {
                return Some(Inconsistency::SlotKeyMismatch {
                    key: id,
                    entity: slot.entity.id(),
                });
            }
            if slot.components.is_empty() {
                return Some(Inconsistency::EmptyEntity(id));
            }
            for (&kind, sequence) in &slot.components {
                if sequence.is_empty() {
                    return Some(Inconsistency::EmptySequence { entity: id, kind });
                }
                if let Some(stray) = sequence.iter().find(|c| c.kind() != kind) {
                    return Some(Inconsistency::MisfiledComponent {
                        entity: id,
                        kind,
                        found: stray.kind(),
                    });
                }
                if !self.index.contains(kind, id) {
                    return Some(Inconsistency::MissingFromIndex { entity: id, kind });
                }
                total += sequence.len();
            }
        }

        for (kind, bucket) in self.index.iter() {
            if bucket.entities.is_empty() {
                return Some(Inconsistency::EmptyBucket(kind));
            }
            if !self.kinds.contains_key(&kind) {
                return Some(Inconsistency::UnknownKind(kind));
            }
            let mut stored = 0;
            for &id in &bucket.entities {
                match self
                    .entities
                    .get(&id)
                    .and_then(|slot| slot.components.get(&kind))
                {
                    Some(sequence) if !sequence.is_empty() => stored += sequence.len(),
                    _ => return Some(Inconsistency::StaleIndexEntry { entity: id, kind }),
                }
            }
            if stored != bucket.instances {
                return Some(Inconsistency::InstanceCountMismatch {
                    kind,
                    indexed: bucket.instances,
                    stored,
                });
            }
        }

        if total != self.len {
            return Some(Inconsistency::LengthMismatch {
                recorded: self.len,
                actual: total,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use engine_component::{Component, Entity};

    use super::*;

    #[derive(Debug)]
    struct Position;

    impl Component for Position {
        fn type_name() -> &'static str {
            "Position"
        }
    }

    #[derive(Debug)]
    struct Velocity;

    impl Component for Velocity {
        fn type_name() -> &'static str {
            "Velocity"
        }
    }

    const E1: Entity = Entity::from_raw(1);
    const E2: Entity = Entity::from_raw(2);

    fn populated() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.add_component(E1, Position).unwrap();
        registry.add_component(E1, Velocity).unwrap();
        registry.add_component(E2, Position).unwrap();
        registry
    }

    #[test]
    fn test_consistent_through_lifecycle() {
        let mut registry = ComponentRegistry::new();
        assert!(registry.validate_registry());

        registry.add_component(E1, Position).unwrap();
        let velocity = registry.add_component(E1, Velocity).unwrap();
        assert!(registry.validate_registry());

        registry.remove_component(E1, &velocity);
        assert!(registry.validate_registry());

        registry.remove_entity_components(E1);
        assert!(registry.validate_registry());

        registry.add_component(E2, Position).unwrap();
        registry.clear();
        assert!(registry.validate_registry());
    }

    #[test]
    fn test_detects_stale_index_entry() {
        let mut registry = populated();
        registry.entities.remove(&E2.id());
        registry.len -= 1;
        assert_eq!(
            registry.find_inconsistency(),
            Some(Inconsistency::StaleIndexEntry {
                entity: E2.id(),
                kind: Position::component_type_id()
            })
        );
        assert!(!registry.validate_registry());
    }

    #[test]
    fn test_detects_missing_index_entry() {
        let mut registry = populated();
        let kind = Velocity::component_type_id();
        registry.index.remove(kind, E1.id(), 1, true);
        assert_eq!(
            registry.find_inconsistency(),
            Some(Inconsistency::MissingFromIndex {
                entity: E1.id(),
                kind
            })
        );
    }

    #[test]
    fn test_detects_empty_sequence() {
        let mut registry = populated();
        let kind = Velocity::component_type_id();
        registry
            .entities
            .get_mut(&E1.id())
            .unwrap()
            .components
            .get_mut(&kind)
            .unwrap()
            .clear();
        assert_eq!(
            registry.find_inconsistency(),
            Some(Inconsistency::EmptySequence {
                entity: E1.id(),
                kind
            })
        );
    }

    #[test]
    fn test_detects_misfiled_component() {
        let mut registry = populated();
        let kind = Velocity::component_type_id();
        registry
            .entities
            .get_mut(&E1.id())
            .unwrap()
            .components
            .get_mut(&kind)
            .unwrap()[0] = Arc::new(Position);
        assert_eq!(
            registry.find_inconsistency(),
            Some(Inconsistency::MisfiledComponent {
                entity: E1.id(),
                kind,
                found: Position::component_type_id()
            })
        );
    }

    #[test]
    fn test_detects_instance_count_mismatch() {
        let mut registry = populated();
        let kind = Position::component_type_id();
        registry.index.bucket_mut(kind).unwrap().instances += 1;
        assert_eq!(
            registry.find_inconsistency(),
            Some(Inconsistency::InstanceCountMismatch {
                kind,
                indexed: 3,
                stored: 2
            })
        );
    }

    #[test]
    fn test_detects_length_mismatch() {
        let mut registry = populated();
        registry.len = 7;
        assert_eq!(
            registry.find_inconsistency(),
            Some(Inconsistency::LengthMismatch {
                recorded: 7,
                actual: 3
            })
        );
    }

    #[test]
    fn test_detects_unknown_kind() {
        let mut registry = populated();
        registry.kinds.remove(&Velocity::component_type_id());
        assert_eq!(
            registry.find_inconsistency(),
            Some(Inconsistency::UnknownKind(Velocity::component_type_id()))
        );
    }
}
