//! Components, kinds, and an instrumented store shared by the tests.

use std::cell::Cell;
use std::sync::LazyLock;

use kindred_component::{
    Component, ComponentArgs, ComponentMeta, ComponentStore, ComponentTypeId, ConstructionError,
    Entity, ErasedComponent, StoreError, World,
};
use serde::Deserialize;

use crate::binder::EntityBinder;
use crate::error::BindError;
use crate::kind::{Behaviour, EntityKind, FromEntity};
use crate::registry::SlotRegistry;
use crate::slot::SlotSpec;

#[derive(Debug, Default, Deserialize, PartialEq)]
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

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Direction {
    pub x: f32,
    pub y: f32,
}

impl Component for Direction {
    const FIELDS: &'static [&'static str] = &["x", "y"];

    fn type_name() -> &'static str {
        "Direction"
    }
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct Sprite {
    pub path: String,
}

impl Component for Sprite {
    const FIELDS: &'static [&'static str] = &["path"];

    fn type_name() -> &'static str {
        "Sprite"
    }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Circle {
    pub radius: f32,
}

impl Component for Circle {
    fn type_name() -> &'static str {
        "Circle"
    }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Square {
    pub side: f32,
}

impl Component for Square {
    fn type_name() -> &'static str {
        "Square"
    }
}

/// `position = Component(Position, x=0, y=0)`.
pub struct Player<'w> {
    pub binder: EntityBinder<'w>,
}

impl EntityKind for Player<'_> {
    fn slots() -> &'static SlotRegistry {
        static SLOTS: LazyLock<SlotRegistry> = LazyLock::new(|| {
            SlotRegistry::builder("Player")
                .slot(
                    "position",
                    SlotSpec::of::<Position>().kwarg("x", 0.0).kwarg("y", 0.0),
                )
                .build()
        });
        &SLOTS
    }
}

/// Moves `position` along `direction` every tick.
pub struct Walker<'w> {
    pub binder: EntityBinder<'w>,
}

impl EntityKind for Walker<'_> {
    fn slots() -> &'static SlotRegistry {
        static SLOTS: LazyLock<SlotRegistry> = LazyLock::new(|| {
            SlotRegistry::builder("Walker")
                .extends(BaseEntity::slots())
                .slot("position", SlotSpec::of::<Position>())
                .build()
        });
        &SLOTS
    }
}

/// Extra constructor arguments, when given, are the starting position.
impl<'w> FromEntity<'w> for Walker<'w> {
    fn from_entity(
        store: &'w dyn ComponentStore,
        entity: Entity,
        args: &ComponentArgs,
    ) -> Result<Self, BindError> {
        let mut binder = EntityBinder::wrap_kind::<Walker>(store, entity)?;
        if !args.is_empty() {
            let start = Position::construct(args).map_err(|source| BindError::Construction {
                slot: "position".to_string(),
                source,
            })?;
            *binder.get::<Position>("position")?.borrow_mut() = start;
        }
        Ok(Self { binder })
    }
}

impl Behaviour for Walker<'_> {
    fn entity(&self) -> Entity {
        self.binder.entity()
    }

    fn update(&mut self, dt: f64) -> Result<(), BindError> {
        let direction = self.binder.get::<Direction>("direction")?;
        let position = self.binder.get::<Position>("position")?;
        let direction = direction.borrow();
        let mut position = position.borrow_mut();
        position.x += direction.x * dt as f32;
        position.y += direction.y * dt as f32;
        Ok(())
    }
}

/// `direction = Component(Direction, 1, 0)`.
pub struct BaseEntity;

impl EntityKind for BaseEntity {
    fn slots() -> &'static SlotRegistry {
        static SLOTS: LazyLock<SlotRegistry> = LazyLock::new(|| {
            SlotRegistry::builder("BaseEntity")
                .slot("direction", SlotSpec::of::<Direction>().arg(1.0).arg(0.0))
                .build()
        });
        &SLOTS
    }
}

/// Declares `body` as a [`Circle`].
pub struct Shape;

impl EntityKind for Shape {
    fn slots() -> &'static SlotRegistry {
        static SLOTS: LazyLock<SlotRegistry> = LazyLock::new(|| {
            SlotRegistry::builder("Shape")
                .slot("body", SlotSpec::of::<Circle>().kwarg("radius", 2.0))
                .build()
        });
        &SLOTS
    }
}

/// Redeclares `body` as a [`Square`].
pub struct Block;

impl EntityKind for Block {
    fn slots() -> &'static SlotRegistry {
        static SLOTS: LazyLock<SlotRegistry> = LazyLock::new(|| {
            SlotRegistry::builder("Block")
                .extends(Shape::slots())
                .slot("body", SlotSpec::of::<Square>().kwarg("side", 3.0))
                .build()
        });
        &SLOTS
    }
}

/// Has a `sprite`.
pub struct Drawable;

impl EntityKind for Drawable {
    fn slots() -> &'static SlotRegistry {
        static SLOTS: LazyLock<SlotRegistry> = LazyLock::new(|| {
            SlotRegistry::builder("Drawable")
                .slot("sprite", SlotSpec::of::<Sprite>().arg("player.png"))
                .build()
        });
        &SLOTS
    }
}

/// `Mob(Walker, Drawable)`: no overlapping slot names.
pub struct Mob;

impl EntityKind for Mob {
    fn slots() -> &'static SlotRegistry {
        static SLOTS: LazyLock<SlotRegistry> = LazyLock::new(|| {
            SlotRegistry::builder("Mob")
                .extends(Walker::slots())
                .extends(Drawable::slots())
                .build()
        });
        &SLOTS
    }
}

/// A sprite slot whose arguments cannot build a [`Sprite`].
pub struct Broken;

impl EntityKind for Broken {
    fn slots() -> &'static SlotRegistry {
        static SLOTS: LazyLock<SlotRegistry> = LazyLock::new(|| {
            SlotRegistry::builder("Broken")
                .slot("position", SlotSpec::of::<Position>())
                .slot("sprite", SlotSpec::of::<Sprite>().arg(42))
                .build()
        });
        &SLOTS
    }
}

/// A [`World`] that counts how often each store operation runs.
#[derive(Debug, Default)]
pub struct CountingStore {
    pub world: World,
    pub lookups: Cell<usize>,
    pub creates: Cell<usize>,
    pub attaches: Cell<usize>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ComponentStore for CountingStore {
    fn is_live(&self, entity: Entity) -> bool {
        self.world.is_live(entity)
    }

    fn has_component(&self, entity: Entity, type_id: ComponentTypeId) -> bool {
        self.world.has_component(entity, type_id)
    }

    fn get_component(&self, entity: Entity, type_id: ComponentTypeId) -> Option<ErasedComponent> {
        self.lookups.set(self.lookups.get() + 1);
        self.world.get_component(entity, type_id)
    }

    fn create_component(
        &self,
        meta: &ComponentMeta,
        args: &ComponentArgs,
    ) -> Result<ErasedComponent, ConstructionError> {
        self.creates.set(self.creates.get() + 1);
        self.world.create_component(meta, args)
    }

    fn attach(
        &self,
        entity: Entity,
        component: ErasedComponent,
    ) -> Result<ErasedComponent, StoreError> {
        self.attaches.set(self.attaches.get() + 1);
        self.world.attach(entity, component)
    }
}
