//! Dispatching per-tick updates to wrapped entities.
//!
//! A [`BehaviourSystem`] keeps the behaviour objects of every wrapped entity
//! and calls [`Behaviour::update`] on each of them once per tick. Behaviours
//! whose entity has been destroyed are dropped before dispatch.
//!
//! Behaviours are either built by the caller and [`add`](BehaviourSystem::add)ed,
//! or built by the system from a registered kind name:
//! [`spawn`](BehaviourSystem::spawn) takes the name and extra constructor
//! arguments directly, [`adopt`](BehaviourSystem::adopt) reads them from a
//! [`KindTag`] component attached to the entity.

use std::collections::HashMap;

use kindred_component::{Component, ComponentArgs, ComponentStore, Entity};
use tracing::{debug, error};

use crate::error::BindError;
use crate::kind::{Behaviour, FromEntity, KindTag};

/// Builds a boxed behaviour of one registered kind.
type Constructor<'s> = fn(
    &'s dyn ComponentStore,
    Entity,
    &ComponentArgs,
) -> Result<Box<dyn Behaviour + 's>, BindError>;

fn construct<'s, K: FromEntity<'s>>(
    store: &'s dyn ComponentStore,
    entity: Entity,
    args: &ComponentArgs,
) -> Result<Box<dyn Behaviour + 's>, BindError> {
    Ok(Box::new(K::from_entity(store, entity, args)?))
}

/// Holds wrapped entities and updates them each tick.
pub struct BehaviourSystem<'s> {
    store: &'s dyn ComponentStore,
    behaviours: Vec<Box<dyn Behaviour + 's>>,
    constructors: HashMap<&'static str, Constructor<'s>>,
}

impl<'s> BehaviourSystem<'s> {
    /// Create an empty system over `store`.
    #[must_use]
    pub fn new(store: &'s dyn ComponentStore) -> Self {
        Self {
            store,
            behaviours: Vec::new(),
            constructors: HashMap::new(),
        }
    }

    /// Make kind `K` constructible by its registry name.
    pub fn register<K: FromEntity<'s>>(&mut self) {
        let kind = K::slots().kind();
        self.constructors.insert(kind, construct::<K>);
        debug!(kind, "registered kind constructor");
    }

    /// Returns `true` if a constructor is registered for `kind`.
    #[must_use]
    pub fn is_registered(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Add a behaviour. Updates run in insertion order.
    pub fn add(&mut self, behaviour: impl Behaviour + 's) {
        self.behaviours.push(Box::new(behaviour));
    }

    /// Build the registered kind `kind` for `entity` with extra constructor
    /// `args`, and add it.
    ///
    /// # Errors
    ///
    /// - [`BindError::UnknownKind`] if no constructor is registered for `kind`.
    /// - Whatever the kind's constructor returns; nothing is added then.
    pub fn spawn(
        &mut self,
        entity: Entity,
        kind: &str,
        args: &ComponentArgs,
    ) -> Result<(), BindError> {
        let constructor = self
            .constructors
            .get(kind)
            .ok_or_else(|| BindError::UnknownKind(kind.to_string()))?;
        let behaviour = constructor(self.store, entity, args)?;
        debug!(%entity, kind, "spawned behaviour");
        self.behaviours.push(behaviour);
        Ok(())
    }

    /// Build and add the kind declared by `entity`'s [`KindTag`].
    ///
    /// Returns `false`, and does nothing, if the entity carries no tag or is
    /// already driven by this system.
    ///
    /// # Errors
    ///
    /// - [`BindError::InvalidEntity`] if `entity` is not live.
    /// - Otherwise as for [`spawn`](Self::spawn).
    pub fn adopt(&mut self, entity: Entity) -> Result<bool, BindError> {
        if !self.store.is_live(entity) {
            return Err(BindError::InvalidEntity(entity));
        }
        if self.behaviours.iter().any(|b| b.entity() == entity) {
            return Ok(false);
        }
        let Some(tag) = self
            .store
            .get_component(entity, KindTag::component_type_id())
            .and_then(|component| component.downcast::<KindTag>())
        else {
            return Ok(false);
        };
        let (kind, args) = {
            let tag = tag.borrow();
            (tag.kind.clone(), tag.to_args())
        };
        self.spawn(entity, &kind, &args)?;
        Ok(true)
    }

    /// Number of behaviours currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.behaviours.len()
    }

    /// Returns `true` if the system holds no behaviours.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.behaviours.is_empty()
    }

    /// Entities currently driven by this system.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        self.behaviours.iter().map(|b| b.entity()).collect()
    }

    /// Drop behaviours whose entity is no longer live.
    ///
    /// Returns the number dropped.
    pub fn prune(&mut self) -> usize {
        let store = self.store;
        let before = self.behaviours.len();
        self.behaviours.retain(|behaviour| {
            let entity = behaviour.entity();
            let live = store.is_live(entity);
            if !live {
                debug!(%entity, "dropping behaviour of destroyed entity");
            }
            live
        });
        before - self.behaviours.len()
    }

    /// Run one tick: prune dead entities, then update every behaviour.
    ///
    /// # Errors
    ///
    /// Stops at the first failing update and returns its error unchanged.
    pub fn update(&mut self, dt: f64) -> Result<(), BindError> {
        self.prune();
        for behaviour in &mut self.behaviours {
            if let Err(err) = behaviour.update(dt) {
                error!(entity = %behaviour.entity(), %err, "entity update failed");
                return Err(err);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for BehaviourSystem<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.constructors.keys().copied().collect();
        kinds.sort_unstable();
        f.debug_struct("BehaviourSystem")
            .field("behaviours", &self.behaviours.len())
            .field("kinds", &kinds)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use kindred_component::World;

    use super::*;
    use crate::binder::EntityBinder;
    use crate::fixtures::{Broken, Position, Walker};
    use crate::kind::EntityKind;

    struct Idle(Entity);

    impl Behaviour for Idle {
        fn entity(&self) -> Entity {
            self.0
        }
    }

    struct Faulty<'w>(EntityBinder<'w>);

    impl Behaviour for Faulty<'_> {
        fn entity(&self) -> Entity {
            self.0.entity()
        }

        fn update(&mut self, _dt: f64) -> Result<(), BindError> {
            self.0.get::<crate::fixtures::Sprite>("sprite")?;
            Ok(())
        }
    }

    fn walker<'w>(world: &'w World) -> Walker<'w> {
        let entity = world.spawn().unwrap();
        Walker {
            binder: EntityBinder::wrap_kind::<Walker>(world, entity).unwrap(),
        }
    }

    fn position(world: &World, entity: Entity) -> (f32, f32) {
        let position = world.component::<Position>(entity).unwrap();
        let position = position.borrow();
        (position.x, position.y)
    }

    #[test]
    fn test_update_dispatches_to_every_behaviour() {
        let world = World::new();
        let mut system = BehaviourSystem::new(&world);
        let a = walker(&world);
        let b = walker(&world);
        let (ea, eb) = (a.binder.entity(), b.binder.entity());
        system.add(a);
        system.add(b);

        system.update(0.5).unwrap();
        system.update(0.5).unwrap();

        for entity in [ea, eb] {
            let position = world.component::<Position>(entity).unwrap();
            assert_eq!(position.borrow().x, 1.0);
            assert_eq!(position.borrow().y, 0.0);
        }
    }

    #[test]
    fn test_default_update_is_noop() {
        let world = World::new();
        let entity = world.spawn().unwrap();
        let mut system = BehaviourSystem::new(&world);
        system.add(Idle(entity));
        system.update(1.0).unwrap();
        assert!(world.component_names(entity).is_empty());
        assert_eq!(system.entities(), vec![entity]);
    }

    #[test]
    fn test_destroyed_entities_are_dropped() {
        let world = World::new();
        let mut system = BehaviourSystem::new(&world);
        let a = walker(&world);
        let b = walker(&world);
        let doomed = a.binder.entity();
        system.add(a);
        system.add(b);

        world.despawn(doomed).unwrap();
        system.update(0.1).unwrap();
        assert_eq!(system.len(), 1);
        assert!(!system.entities().contains(&doomed));
    }

    #[test]
    fn test_update_error_propagates() {
        let world = World::new();
        let entity = world.spawn().unwrap();
        let mut system = BehaviourSystem::new(&world);
        system.add(Faulty(EntityBinder::wrap(&world, entity, Broken::slots()).unwrap()));
        let err = system.update(0.1).unwrap_err();
        assert!(matches!(err, BindError::Construction { .. }));
        assert_eq!(system.len(), 1);
    }

    #[test]
    fn test_empty_system() {
        let world = World::new();
        let mut system = BehaviourSystem::new(&world);
        assert!(system.is_empty());
        system.update(0.1).unwrap();
        assert_eq!(system.prune(), 0);
    }

    #[test]
    fn test_spawn_registered_kind_with_args() {
        let world = World::new();
        let mut system = BehaviourSystem::new(&world);
        system.register::<Walker>();
        assert!(system.is_registered("Walker"));

        let entity = world.spawn().unwrap();
        system
            .spawn(entity, "Walker", &ComponentArgs::new().arg(3.0).arg(4.0))
            .unwrap();
        assert_eq!(system.entities(), vec![entity]);
        assert_eq!(position(&world, entity), (3.0, 4.0));

        system.update(1.0).unwrap();
        assert_eq!(position(&world, entity), (4.0, 4.0));
    }

    #[test]
    fn test_spawn_without_args_uses_declared_slots() {
        let world = World::new();
        let mut system = BehaviourSystem::new(&world);
        system.register::<Walker>();
        let entity = world.spawn().unwrap();
        system.spawn(entity, "Walker", &ComponentArgs::new()).unwrap();
        system.update(2.0).unwrap();
        assert_eq!(position(&world, entity), (2.0, 0.0));
    }

    #[test]
    fn test_spawn_unknown_kind() {
        let world = World::new();
        let mut system = BehaviourSystem::new(&world);
        let entity = world.spawn().unwrap();
        assert_eq!(
            system.spawn(entity, "Walker", &ComponentArgs::new()),
            Err(BindError::UnknownKind("Walker".to_string()))
        );
        assert!(system.is_empty());
    }

    #[test]
    fn test_spawn_with_bad_args_adds_nothing() {
        let world = World::new();
        let mut system = BehaviourSystem::new(&world);
        system.register::<Walker>();
        let entity = world.spawn().unwrap();
        let err = system
            .spawn(entity, "Walker", &ComponentArgs::new().arg("north"))
            .unwrap_err();
        assert!(matches!(err, BindError::Construction { ref slot, .. } if slot == "position"));
        assert!(system.is_empty());
    }

    #[test]
    fn test_spawn_dead_entity_fails() {
        let world = World::new();
        let mut system = BehaviourSystem::new(&world);
        system.register::<Walker>();
        let entity = world.spawn().unwrap();
        world.despawn(entity).unwrap();
        assert_eq!(
            system.spawn(entity, "Walker", &ComponentArgs::new()),
            Err(BindError::InvalidEntity(entity))
        );
    }

    #[test]
    fn test_adopt_builds_tagged_kind() {
        let world = World::new();
        let mut system = BehaviourSystem::new(&world);
        system.register::<Walker>();
        let tagged = world.spawn().unwrap();
        world
            .assign(tagged, KindTag::new(Walker::slots().kind()).arg(1.0).arg(2.0))
            .unwrap();
        let untagged = world.spawn().unwrap();

        assert!(system.adopt(tagged).unwrap());
        assert!(!system.adopt(tagged).unwrap());
        assert!(!system.adopt(untagged).unwrap());
        assert_eq!(system.entities(), vec![tagged]);
        assert_eq!(position(&world, tagged), (1.0, 2.0));

        system.update(1.0).unwrap();
        assert_eq!(position(&world, tagged), (2.0, 2.0));
    }

    #[test]
    fn test_adopt_unregistered_tag() {
        let world = World::new();
        let mut system = BehaviourSystem::new(&world);
        let entity = world.spawn().unwrap();
        world.assign(entity, KindTag::new("Ghost")).unwrap();
        assert_eq!(
            system.adopt(entity),
            Err(BindError::UnknownKind("Ghost".to_string()))
        );
    }

    #[test]
    fn test_kind_tag_from_declared_args() {
        let tag = KindTag::meta()
            .construct(&ComponentArgs::new().arg("Walker").arg(serde_json::json!([5.0, 6.0])))
            .unwrap()
            .downcast::<KindTag>()
            .unwrap();
        let tag = tag.borrow();
        assert_eq!(tag.kind, Walker::slots().kind());
        assert_eq!(tag.to_args(), ComponentArgs::new().arg(5.0).arg(6.0));
    }
}
