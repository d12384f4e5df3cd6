//! Core [`Component`] trait and associated metadata.
//!
//! Every piece of data stored in the registry must implement [`Component`].
//! The trait requires `Debug + Send + Sync + 'static` so stored instances can
//! be shared as immutable snapshots, including across threads.
//!
//! ## Kinds
//!
//! The registry groups instances by [`ComponentTypeId`], a hash of
//! [`Component::type_name`]. Unlike `TypeId` it is the same in every build,
//! so log lines and stats from different runs can be compared. The Rust
//! `TypeId` is still recorded in [`ComponentMeta`] to catch two types that
//! hash to the same kind.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Registry key for a component kind.
///
/// Two types with the same [`Component::type_name`] share a kind id; the
/// registry detects that case when it first sees the second type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;

    /// Kind id for a component name: the 64-bit FNV-1a hash of its bytes.
    ///
    /// `const` so kind ids can be computed in constant position, e.g. for
    /// tables keyed by kind.
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::OFFSET;
        let mut at = 0;
        while at < bytes.len() {
            hash = (hash ^ bytes[at] as u64).wrapping_mul(Self::PRIME);
            at += 1;
        }
        Self(hash)
    }

    /// Kind id of the Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Metadata about a component kind, recorded by the registry the first time
/// an instance of that kind is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentMeta {
    /// The kind identifier.
    pub type_id: ComponentTypeId,
    /// The human-readable name of the component (e.g. `"Position"`).
    pub name: &'static str,
    /// The Rust type registered under this kind. Two Rust types hashing to
    /// the same kind are a collision.
    pub rust_type: TypeId,
}

/// The core component trait.
///
/// # Examples
///
/// ```rust
/// use engine_component::Component;
///
/// #[derive(Debug, Clone)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {
///     fn type_name() -> &'static str { "Health" }
///
///     fn validate(&self) -> bool {
///         self.max > 0.0 && (0.0..=self.max).contains(&self.current)
///     }
/// }
/// ```
pub trait Component: fmt::Debug + Send + Sync + 'static {
    /// A human-readable name for this component kind.
    fn type_name() -> &'static str;

    /// Returns the [`ComponentTypeId`] for this component kind.
    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }

    /// Returns the [`ComponentMeta`] descriptor for this component kind.
    fn meta() -> ComponentMeta {
        ComponentMeta {
            type_id: Self::component_type_id(),
            name: Self::type_name(),
            rust_type: TypeId::of::<Self>(),
        }
    }

    /// Checks the instance's data before it is stored. Defaults to `true`.
    fn validate(&self) -> bool {
        true
    }
}

/// Object-safe view of a stored component instance.
///
/// Implemented for every [`Component`]; the registry stores instances as
/// [`ComponentRef`] and recovers the concrete type by downcasting.
pub trait AnyComponent: Any + Send + Sync + fmt::Debug {
    /// The kind this instance belongs to.
    fn kind(&self) -> ComponentTypeId;

    /// The kind's human-readable name.
    fn kind_name(&self) -> &'static str;

    /// Borrow as `Any` for a typed downcast.
    fn as_any(&self) -> &dyn Any;

    /// Mutable counterpart of [`as_any`](Self::as_any).
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Convert the shared handle for [`Arc::downcast`].
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Component> AnyComponent for T {
    fn kind(&self) -> ComponentTypeId {
        T::component_type_id()
    }

    fn kind_name(&self) -> &'static str {
        T::type_name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl dyn AnyComponent {
    /// Returns `true` if the instance is a `T`.
    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow the instance as a `T`, if it is one.
    #[must_use]
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// A shared, immutable handle to a stored component instance of any kind.
pub type ComponentRef = Arc<dyn AnyComponent>;

/// Recover a typed handle from a [`ComponentRef`], sharing the same instance.
#[must_use]
pub fn downcast_component<T: Component>(component: &ComponentRef) -> Option<Arc<T>> {
    Arc::clone(component).into_any().downcast::<T>().ok()
}

/// Returns `true` if both handles point at the same stored instance.
///
/// Component identity is instance identity: two structurally equal values are
/// still distinct instances.
#[must_use]
pub fn same_instance<T: ?Sized, U: ?Sized>(a: &Arc<T>, b: &Arc<U>) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}
