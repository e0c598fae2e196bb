//! # kindred_component
//!
//! The component side of kindred: what a component is, how it is built from
//! declared arguments, and the store capability that entities and components
//! live in.
//!
//! This crate provides:
//!
//! - [`Component`] trait — the contract attachable data must satisfy.
//! - [`ComponentArgs`] — positional and keyword constructor arguments.
//! - [`Entity`] — generational entity handles, allocated by [`EntityAllocator`].
//! - [`ComponentStore`] — existence, lookup, creation, and attachment.
//! - [`World`] — the in-memory reference store.

pub mod args;
pub mod component;
pub mod entity;
pub mod error;
pub mod store;
pub mod world;

pub use args::ComponentArgs;
pub use component::{Component, ComponentMeta, ComponentTypeId, ConstructFn};
pub use entity::{Entity, EntityAllocator};
pub use error::{ConstructionError, StoreError};
pub use store::{ComponentRef, ComponentStore, ErasedComponent};
pub use world::World;
