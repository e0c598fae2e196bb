//! Demo components and entity kinds.

use std::sync::LazyLock;

use kindred_binding::{
    Behaviour, BindError, EntityBinder, EntityKind, FromEntity, SlotKey, SlotRegistry, SlotSpec,
};
use kindred_component::{Component, ComponentArgs, ComponentStore, Entity};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Component for Position {
    const FIELDS: &'static [&'static str] = &["x", "y"];

    fn type_name() -> &'static str {
        "Position"
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

impl Component for Velocity {
    const FIELDS: &'static [&'static str] = &["dx", "dy"];

    fn type_name() -> &'static str {
        "Velocity"
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Sprite {
    pub path: String,
}

impl Component for Sprite {
    const FIELDS: &'static [&'static str] = &["path"];

    fn type_name() -> &'static str {
        "Sprite"
    }
}

/// Anything that moves: integrates `velocity` into `position` every tick.
pub struct Actor<'w> {
    binder: EntityBinder<'w>,
    position: SlotKey<Position>,
    velocity: SlotKey<Velocity>,
}

impl EntityKind for Actor<'_> {
    fn slots() -> &'static SlotRegistry {
        static SLOTS: LazyLock<SlotRegistry> = LazyLock::new(|| {
            SlotRegistry::builder("Actor")
                .slot("position", SlotSpec::of::<Position>())
                .slot("velocity", SlotSpec::of::<Velocity>().arg(1.0).arg(0.0))
                .build()
        });
        &SLOTS
    }
}

impl<'w> Actor<'w> {
    /// Wrap `entity` as an actor.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::InvalidEntity`] if `entity` is not live.
    pub fn new(store: &'w dyn ComponentStore, entity: Entity) -> Result<Self, BindError> {
        let slots = Self::slots();
        Ok(Self {
            binder: EntityBinder::wrap(store, entity, slots)?,
            position: slots.key("position")?,
            velocity: slots.key("velocity")?,
        })
    }
}

impl<'w> FromEntity<'w> for Actor<'w> {
    fn from_entity(
        store: &'w dyn ComponentStore,
        entity: Entity,
        args: &ComponentArgs,
    ) -> Result<Self, BindError> {
        let mut actor = Self::new(store, entity)?;
        if let Some(start) = start_position(args)? {
            *actor.binder.get_by_key(actor.position)?.borrow_mut() = start;
        }
        Ok(actor)
    }
}

impl Behaviour for Actor<'_> {
    fn entity(&self) -> Entity {
        self.binder.entity()
    }

    fn update(&mut self, dt: f64) -> Result<(), BindError> {
        integrate(&mut self.binder, self.position, self.velocity, dt)
    }
}

/// An actor with a sprite and a faster default velocity.
pub struct Player<'w> {
    binder: EntityBinder<'w>,
    position: SlotKey<Position>,
    velocity: SlotKey<Velocity>,
}

impl EntityKind for Player<'_> {
    fn slots() -> &'static SlotRegistry {
        static SLOTS: LazyLock<SlotRegistry> = LazyLock::new(|| {
            SlotRegistry::builder("Player")
                .extends(Actor::slots())
                .slot("velocity", SlotSpec::of::<Velocity>().kwarg("dx", 2.0).kwarg("dy", 1.0))
                .slot("sprite", SlotSpec::of::<Sprite>().arg("player.png"))
                .build()
        });
        &SLOTS
    }
}

impl<'w> Player<'w> {
    /// Wrap `entity` as a player. All slots are resolved immediately so the
    /// entity is fully populated for any code inspecting it afterwards.
    ///
    /// # Errors
    ///
    /// Propagates slot resolution failures.
    pub fn new(store: &'w dyn ComponentStore, entity: Entity) -> Result<Self, BindError> {
        let slots = Self::slots();
        Ok(Self {
            binder: EntityBinder::wrap_eager(store, entity, slots)?,
            position: slots.key("position")?,
            velocity: slots.key("velocity")?,
        })
    }

    /// Wrap `entity` as a player placed at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Propagates slot resolution failures.
    pub fn at(
        store: &'w dyn ComponentStore,
        entity: Entity,
        x: f32,
        y: f32,
    ) -> Result<Self, BindError> {
        let mut player = Self::new(store, entity)?;
        *player.binder.get_by_key(player.position)?.borrow_mut() = Position { x, y };
        Ok(player)
    }

    /// Current position.
    ///
    /// # Errors
    ///
    /// Propagates slot resolution failures.
    pub fn position(&mut self) -> Result<Position, BindError> {
        Ok(*self.binder.get_by_key(self.position)?.borrow())
    }

    /// The sprite asset path.
    ///
    /// # Errors
    ///
    /// Propagates slot resolution failures.
    pub fn sprite(&mut self) -> Result<String, BindError> {
        Ok(self.binder.get::<Sprite>("sprite")?.borrow().path.clone())
    }
}

impl<'w> FromEntity<'w> for Player<'w> {
    fn from_entity(
        store: &'w dyn ComponentStore,
        entity: Entity,
        args: &ComponentArgs,
    ) -> Result<Self, BindError> {
        match start_position(args)? {
            Some(start) => Self::at(store, entity, start.x, start.y),
            None => Self::new(store, entity),
        }
    }
}

impl Behaviour for Player<'_> {
    fn entity(&self) -> Entity {
        self.binder.entity()
    }

    fn update(&mut self, dt: f64) -> Result<(), BindError> {
        integrate(&mut self.binder, self.position, self.velocity, dt)
    }
}

/// Extra constructor arguments, if any, are a starting `Position`.
fn start_position(args: &ComponentArgs) -> Result<Option<Position>, BindError> {
    if args.is_empty() {
        return Ok(None);
    }
    Position::construct(args)
        .map(Some)
        .map_err(|source| BindError::Construction {
            slot: "position".to_string(),
            source,
        })
}

fn integrate(
    binder: &mut EntityBinder<'_>,
    position: SlotKey<Position>,
    velocity: SlotKey<Velocity>,
    dt: f64,
) -> Result<(), BindError> {
    let velocity = *binder.get_by_key(velocity)?.borrow();
    let position = binder.get_by_key(position)?;
    let mut position = position.borrow_mut();
    position.x += velocity.dx * dt as f32;
    position.y += velocity.dy * dt as f32;
    Ok(())
}
