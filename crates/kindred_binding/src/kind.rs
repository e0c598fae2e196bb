//! Entity kinds and their per-tick behaviour.
//!
//! An entity kind is a Rust type that declares slots once and wraps an
//! [`EntityBinder`](crate::EntityBinder) per instance:
//!
//! ```rust
//! use std::sync::LazyLock;
//!
//! use kindred_binding::{BindError, Behaviour, EntityBinder, EntityKind, SlotRegistry, SlotSpec};
//! use kindred_component::{Component, ComponentStore, Entity, World};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! #[serde(default)]
//! struct Position {
//!     x: f32,
//!     y: f32,
//! }
//!
//! impl Component for Position {
//!     const FIELDS: &'static [&'static str] = &["x", "y"];
//!     fn type_name() -> &'static str { "Position" }
//! }
//!
//! struct Player<'w> {
//!     binder: EntityBinder<'w>,
//! }
//!
//! impl EntityKind for Player<'_> {
//!     fn slots() -> &'static SlotRegistry {
//!         static SLOTS: LazyLock<SlotRegistry> = LazyLock::new(|| {
//!             SlotRegistry::builder("Player")
//!                 .slot("position", SlotSpec::of::<Position>().kwarg("x", 1.0))
//!                 .build()
//!         });
//!         &SLOTS
//!     }
//! }
//!
//! impl Behaviour for Player<'_> {
//!     fn entity(&self) -> Entity {
//!         self.binder.entity()
//!     }
//!
//!     fn update(&mut self, dt: f64) -> Result<(), BindError> {
//!         self.binder.get::<Position>("position")?.borrow_mut().x += dt as f32;
//!         Ok(())
//!     }
//! }
//!
//! let world = World::new();
//! let entity = world.spawn().unwrap();
//! let mut player = Player { binder: EntityBinder::wrap_kind::<Player>(&world, entity).unwrap() };
//! player.update(0.5).unwrap();
//! assert_eq!(world.component::<Position>(entity).unwrap().borrow().x, 1.5);
//! ```

use kindred_component::{Component, ComponentArgs, ComponentStore, Entity};
use serde::Deserialize;
use serde_json::Value;

use crate::error::BindError;
use crate::registry::SlotRegistry;

/// A type that declares component slots.
///
/// Implementations return a registry built once, typically from a
/// `LazyLock` static, and inherit from other kinds by passing their
/// registries to [`SlotRegistryBuilder::extends`](crate::SlotRegistryBuilder::extends).
pub trait EntityKind {
    /// The kind's merged slot table.
    fn slots() -> &'static SlotRegistry;
}

/// Per-tick logic of a wrapped entity.
pub trait Behaviour {
    /// The entity this behaviour drives.
    fn entity(&self) -> Entity;

    /// Advance by `dt` seconds. Does nothing unless overridden.
    ///
    /// # Errors
    ///
    /// Slot resolution failures propagate unchanged.
    fn update(&mut self, dt: f64) -> Result<(), BindError> {
        let _ = dt;
        Ok(())
    }
}

/// A kind that can be built from an entity handle plus extra constructor
/// arguments, so a [`BehaviourSystem`](crate::BehaviourSystem) can create it
/// by name.
pub trait FromEntity<'s>: EntityKind + Behaviour + Sized + 's {
    /// Wrap `entity` as this kind, applying `args`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError`] when the entity cannot be wrapped or `args` do
    /// not fit.
    fn from_entity(
        store: &'s dyn ComponentStore,
        entity: Entity,
        args: &ComponentArgs,
    ) -> Result<Self, BindError>;
}

/// Declares which kind an entity is, for code that only holds the raw handle.
///
/// [`BehaviourSystem::adopt`](crate::BehaviourSystem::adopt) builds the named
/// kind with `args` as its extra constructor arguments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KindTag {
    /// Registered kind name, as passed to
    /// [`SlotRegistry::builder`](crate::SlotRegistry::builder).
    pub kind: String,
    /// Extra positional constructor arguments.
    #[serde(default)]
    pub args: Vec<Value>,
}

impl KindTag {
    /// Tag an entity as `kind` with no extra arguments.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            args: Vec::new(),
        }
    }

    /// Append an extra constructor argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// The extra arguments as a constructor argument list.
    #[must_use]
    pub fn to_args(&self) -> ComponentArgs {
        self.args
            .iter()
            .cloned()
            .fold(ComponentArgs::new(), |args, value| args.arg(value))
    }
}

impl Component for KindTag {
    const FIELDS: &'static [&'static str] = &["kind", "args"];

    fn type_name() -> &'static str {
        "KindTag"
    }
}
