//! # engine_component
//!
//! Entity handles, the component contract, and component kind ids. Everything
//! the registry stores or looks up is expressed in these types.
//!
//! This crate provides:
//!
//! - [`Entity`] / [`EntityId`]: stable identifiers with an activity flag.
//! - [`EntityAllocator`]: monotonically increasing, never-recycled ids.
//! - [`Component`] trait: the contract all stored data must satisfy.
//! - [`ComponentTypeId`]: FNV-1a kind ids derived from component names.
//! - [`ComponentRef`]: type-erased shared handles to stored instances.
//! - [`QueryKinds`]: typed component tuples for multi-kind queries.

pub mod component;
pub mod entity;
pub mod query;

pub use component::{
    AnyComponent, Component, ComponentMeta, ComponentRef, ComponentTypeId, downcast_component,
    same_instance,
};
pub use entity::{Entity, EntityAllocator, EntityId};
pub use query::{ComponentSource, QueryKinds};
