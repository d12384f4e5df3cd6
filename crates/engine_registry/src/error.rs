//! Registry error types.

use engine_component::{ComponentTypeId, EntityId};

/// Precondition violations rejected by a mutating registry operation.
///
/// When one of these is returned the registry is left exactly as it was
/// before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Components may not be added to an inactive entity.
    #[error("cannot add component to inactive entity {0}")]
    InactiveEntity(EntityId),

    /// The reserved invalid entity id was used.
    #[error("entity id 0 is reserved and cannot hold components")]
    InvalidEntity,

    /// The component's own `validate()` check failed.
    #[error("component {kind} failed validation for entity {entity}")]
    InvalidComponent {
        /// The entity the component was being added to.
        entity: EntityId,
        /// The component's kind name.
        kind: &'static str,
    },

    /// Two different Rust types share the same kind id.
    #[error("kind {kind} is registered as `{registered}`, cannot store `{incoming}`")]
    KindCollision {
        /// The colliding kind id.
        kind: ComponentTypeId,
        /// Name of the type already stored under this kind.
        registered: &'static str,
        /// Name of the type that was rejected.
        incoming: &'static str,
    },
}
