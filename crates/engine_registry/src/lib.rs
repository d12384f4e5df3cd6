//! # engine_registry
//!
//! The store underneath the simulation: every system reads and writes
//! per-entity component state through a [`ComponentRegistry`].
//!
//! This crate provides:
//!
//! - [`ComponentRegistry`]: owns all component instances, indexed by entity
//!   and by kind, with add/remove/get operations.
//! - Queries: single-kind and multi-kind (intersection) iterators sourced
//!   from the kind index, yielding owned snapshots.
//! - [`ComponentMap`]: kind-keyed snapshot of several sequences.
//! - [`RegistryStats`] and [`Inconsistency`]: diagnostics and validation.
//! - [`RegistryConfig`] / [`RegistryError`]: behaviour switches and
//!   precondition failures.
//!
//! The registry is single-threaded and synchronous. It never calls back into
//! systems.

pub mod config;
pub mod error;
mod index;
pub mod query;
pub mod registry;
pub mod snapshot;
pub mod stats;
pub mod validate;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use query::{
    EntitiesWithComponent, EntitiesWithComponents, EntitiesWithKinds, EntitiesWithSingleComponents,
};
pub use registry::ComponentRegistry;
pub use snapshot::ComponentMap;
pub use stats::RegistryStats;
pub use validate::Inconsistency;
