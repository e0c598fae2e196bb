//! # kindred_binding
//!
//! Declarative component slots for entity kinds.
//!
//! A kind declares, once, which components its entities carry and how to
//! build them. Every wrapped entity of that kind then gets or creates those
//! components on demand, without per-instance boilerplate:
//!
//! - [`SlotSpec`] — one declared slot: a component type and its arguments.
//! - [`SlotRegistry`] — a kind's merged slot table, inherited slots included.
//! - [`EntityBinder`] — resolves and caches slots for one live entity.
//! - [`EntityKind`] / [`Behaviour`] — declaration and per-tick update hooks.
//! - [`BehaviourSystem`] — drives the update hook of every wrapped entity,
//!   and builds registered kinds by name ([`FromEntity`], [`KindTag`]).

pub mod binder;
pub mod error;
pub mod kind;
pub mod registry;
pub mod slot;
pub mod system;

#[cfg(test)]
mod fixtures;

pub use binder::{EntityBinder, Resolution};
pub use error::{BindError, DeclarationConflict};
pub use kind::{Behaviour, EntityKind, FromEntity, KindTag};
pub use registry::{SlotId, SlotKey, SlotRegistry, SlotRegistryBuilder};
pub use slot::SlotSpec;
pub use system::BehaviourSystem;
