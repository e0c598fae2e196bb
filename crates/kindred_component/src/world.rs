//! In-memory entity-component storage.
//!
//! [`World`] is the reference [`ComponentStore`]: it owns entity allocation
//! and every attached component. It also exposes typed helpers for code that
//! manipulates entities directly rather than through declared slots.

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::trace;

use crate::component::{Component, ComponentTypeId};
use crate::entity::{Entity, EntityAllocator};
use crate::error::StoreError;
use crate::store::{ComponentRef, ComponentStore, ErasedComponent};

/// A single entity's component set.
#[derive(Debug, Default)]
struct EntityData {
    components: HashMap<ComponentTypeId, ErasedComponent>,
}

#[derive(Debug, Default)]
struct WorldState {
    allocator: EntityAllocator,
    entities: HashMap<Entity, EntityData>,
}

/// The world: entity lifetimes and the components attached to them.
#[derive(Debug, Default)]
pub struct World {
    state: RefCell<WorldState>,
}

impl World {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Entity lifecycle --

    /// Spawn a new entity with no components.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Exhausted`] when no entity index is left.
    pub fn spawn(&self) -> Result<Entity, StoreError> {
        let mut state = self.state.borrow_mut();
        let entity = state.allocator.allocate().ok_or(StoreError::Exhausted)?;
        state.entities.insert(entity, EntityData::default());
        trace!(%entity, "spawned entity");
        Ok(entity)
    }

    /// Despawn an entity, dropping the world's hold on all of its components.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidEntity`] if the entity is not live.
    pub fn despawn(&self, entity: Entity) -> Result<(), StoreError> {
        let mut state = self.state.borrow_mut();
        if !state.allocator.free(entity) {
            return Err(StoreError::InvalidEntity(entity));
        }
        state.entities.remove(&entity);
        trace!(%entity, "despawned entity");
        Ok(())
    }

    /// Check if an entity exists.
    #[must_use]
    pub fn exists(&self, entity: Entity) -> bool {
        self.state.borrow().allocator.is_live(entity)
    }

    /// Return the count of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.state.borrow().entities.len()
    }

    // -- Typed component operations --

    /// Attach `value` to `entity`, replacing any component of the same type.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidEntity`] if the entity is not live.
    pub fn assign<T: Component>(
        &self,
        entity: Entity,
        value: T,
    ) -> Result<ComponentRef<T>, StoreError> {
        let stored = self.attach(entity, ErasedComponent::new(value))?;
        stored.downcast::<T>().ok_or_else(|| StoreError::Rejected {
            entity,
            component: T::type_name(),
            reason: "stored component has a different concrete type".to_string(),
        })
    }

    /// Get the `T` component of `entity`, if it has one.
    #[must_use]
    pub fn component<T: Component>(&self, entity: Entity) -> Option<ComponentRef<T>> {
        self.get_component(entity, T::component_type_id())?
            .downcast::<T>()
    }

    /// Remove the `T` component from `entity`.
    ///
    /// Returns `true` if a component was removed.
    pub fn remove<T: Component>(&self, entity: Entity) -> bool {
        self.state
            .borrow_mut()
            .entities
            .get_mut(&entity)
            .is_some_and(|data| data.components.remove(&T::component_type_id()).is_some())
    }

    /// Get the type names of all components on an entity.
    #[must_use]
    pub fn component_names(&self, entity: Entity) -> Vec<&'static str> {
        let state = self.state.borrow();
        let mut names: Vec<&'static str> = state
            .entities
            .get(&entity)
            .map(|data| data.components.values().map(ErasedComponent::type_name).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}

impl ComponentStore for World {
    fn is_live(&self, entity: Entity) -> bool {
        self.exists(entity)
    }

    fn has_component(&self, entity: Entity, type_id: ComponentTypeId) -> bool {
        self.state
            .borrow()
            .entities
            .get(&entity)
            .is_some_and(|data| data.components.contains_key(&type_id))
    }

    fn get_component(&self, entity: Entity, type_id: ComponentTypeId) -> Option<ErasedComponent> {
        self.state
            .borrow()
            .entities
            .get(&entity)?
            .components
            .get(&type_id)
            .cloned()
    }

    fn attach(
        &self,
        entity: Entity,
        component: ErasedComponent,
    ) -> Result<ErasedComponent, StoreError> {
        let mut state = self.state.borrow_mut();
        let data = state
            .entities
            .get_mut(&entity)
            .ok_or(StoreError::InvalidEntity(entity))?;
        trace!(%entity, component = component.type_name(), "attached component");
        data.components.insert(component.type_id(), component.clone());
        Ok(component)
    }
}
