//! Binding an entity handle to its kind's declared slots.
//!
//! An [`EntityBinder`] wraps a live entity and resolves each slot of its
//! kind's [`SlotRegistry`] with a get-or-create protocol:
//!
//! 1. If the entity already carries a component of the slot's type, that
//!    component is used. Components attached by other code before wrapping
//!    are never replaced.
//! 2. Otherwise the slot's component is built from its declared arguments and
//!    attached to the entity.
//! 3. The resolved reference is cached for the binder's lifetime.
//!
//! Resolution is lazy by default ([`EntityBinder::wrap`]): a slot is resolved
//! the first time it is accessed. [`EntityBinder::wrap_eager`] resolves every
//! slot up front instead.
//!
//! Every access first asks the store whether the entity is still live, so a
//! cached reference is never handed out for a destroyed entity.

use kindred_component::{Component, ComponentRef, ComponentStore, Entity, ErasedComponent};
use tracing::trace;

use crate::error::BindError;
use crate::kind::EntityKind;
use crate::registry::{SlotId, SlotKey, SlotRegistry, check_type};
use crate::slot::SlotSpec;

/// When slots are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// On first access to each slot.
    #[default]
    Lazy,
    /// All at once, when the binder is created.
    Eager,
}

/// A live entity bound to the declared slots of its kind.
///
/// The binder borrows the store and never owns the entity or its
/// components; dropping it leaves both untouched.
pub struct EntityBinder<'s> {
    store: &'s dyn ComponentStore,
    entity: Entity,
    registry: &'static SlotRegistry,
    /// Resolved components, indexed by [`SlotId`].
    cache: Vec<Option<ErasedComponent>>,
    resolution: Resolution,
}

impl<'s> EntityBinder<'s> {
    /// Wrap `entity`, resolving slots lazily.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::InvalidEntity`] if `entity` is not live.
    pub fn wrap(
        store: &'s dyn ComponentStore,
        entity: Entity,
        registry: &'static SlotRegistry,
    ) -> Result<Self, BindError> {
        if !store.is_live(entity) {
            return Err(BindError::InvalidEntity(entity));
        }
        Ok(Self {
            store,
            entity,
            registry,
            cache: vec![None; registry.len()],
            resolution: Resolution::Lazy,
        })
    }

    /// Wrap `entity` and resolve every slot immediately.
    ///
    /// # Errors
    ///
    /// Returns the first slot resolution failure. Slots resolved before the
    /// failure stay attached in the store.
    pub fn wrap_eager(
        store: &'s dyn ComponentStore,
        entity: Entity,
        registry: &'static SlotRegistry,
    ) -> Result<Self, BindError> {
        let mut binder = Self::wrap(store, entity, registry)?;
        binder.resolution = Resolution::Eager;
        binder.resolve_all()?;
        Ok(binder)
    }

    /// Wrap `entity` with the slots of kind `K`, resolving lazily.
    ///
    /// # Errors
    ///
    /// See [`wrap`](Self::wrap).
    pub fn wrap_kind<K: EntityKind>(
        store: &'s dyn ComponentStore,
        entity: Entity,
    ) -> Result<Self, BindError> {
        Self::wrap(store, entity, K::slots())
    }

    /// Wrap `entity` with the slots of kind `K`, resolving eagerly.
    ///
    /// # Errors
    ///
    /// See [`wrap_eager`](Self::wrap_eager).
    pub fn wrap_kind_eager<K: EntityKind>(
        store: &'s dyn ComponentStore,
        entity: Entity,
    ) -> Result<Self, BindError> {
        Self::wrap_eager(store, entity, K::slots())
    }

    /// The wrapped entity handle.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// The kind's slot table.
    #[must_use]
    pub fn registry(&self) -> &'static SlotRegistry {
        self.registry
    }

    /// The resolution policy this binder was created with.
    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Returns `true` if the wrapped entity is still live.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.store.is_live(self.entity)
    }

    /// Get the component in slot `name`, creating it on first access.
    ///
    /// # Errors
    ///
    /// - [`BindError::InvalidEntity`] if the entity is no longer live.
    /// - [`BindError::UnknownSlot`] if the kind has no such slot.
    /// - [`BindError::SlotTypeMismatch`] if the slot does not hold a `T`.
    /// - [`BindError::Construction`] if the component has to be created and
    ///   its declared arguments do not fit.
    pub fn get<T: Component>(&mut self, name: &str) -> Result<ComponentRef<T>, BindError> {
        let id = self.slot_id(name)?;
        let (_, spec) = self.slot(id)?;
        check_type::<T>(name, spec)?;
        let component = self.resolve(id)?;
        downcast(name, &component)
    }

    /// Get the component behind a pre-validated key, creating it on first
    /// access.
    ///
    /// # Errors
    ///
    /// - [`BindError::ForeignSlotKey`] if `key` belongs to another kind.
    /// - Otherwise as for [`get`](Self::get).
    pub fn get_by_key<T: Component>(
        &mut self,
        key: SlotKey<T>,
    ) -> Result<ComponentRef<T>, BindError> {
        if !self.registry.owns(&key) {
            return Err(BindError::ForeignSlotKey {
                slot: key.name().to_string(),
                key_kind: key.kind(),
                kind: self.registry.kind(),
            });
        }
        let component = self.resolve(key.id())?;
        downcast(key.name(), &component)
    }

    /// Resolve every slot that is not resolved yet.
    ///
    /// # Errors
    ///
    /// Returns the first failure, leaving the failed slot unresolved.
    pub fn resolve_all(&mut self) -> Result<(), BindError> {
        for index in 0..self.registry.len() {
            self.resolve(SlotId(index))?;
        }
        Ok(())
    }

    /// Returns `true` if slot `name` has been resolved by this binder.
    #[must_use]
    pub fn is_resolved(&self, name: &str) -> bool {
        self.registry
            .slot_id(name)
            .is_some_and(|id| self.cache[id.0].is_some())
    }

    /// Returns `true` if the entity currently carries a component of slot
    /// `name`'s type. Never creates anything.
    ///
    /// # Errors
    ///
    /// - [`BindError::InvalidEntity`] if the entity is no longer live.
    /// - [`BindError::UnknownSlot`] if the kind has no such slot.
    pub fn carries(&self, name: &str) -> Result<bool, BindError> {
        if !self.store.is_live(self.entity) {
            return Err(BindError::InvalidEntity(self.entity));
        }
        let (_, spec) = self.slot(self.slot_id(name)?)?;
        Ok(self.store.has_component(self.entity, spec.type_id()))
    }

    fn slot_id(&self, name: &str) -> Result<SlotId, BindError> {
        self.registry
            .slot_id(name)
            .ok_or_else(|| BindError::UnknownSlot {
                kind: self.registry.kind(),
                slot: name.to_string(),
            })
    }

    fn slot(&self, id: SlotId) -> Result<(&'static str, &'static SlotSpec), BindError> {
        let registry: &'static SlotRegistry = self.registry;
        registry
            .slot_at(id)
            .ok_or_else(|| BindError::UnknownSlot {
                kind: registry.kind(),
                slot: format!("#{}", id.0),
            })
    }

    /// The get-or-create protocol for one slot.
    fn resolve(&mut self, id: SlotId) -> Result<ErasedComponent, BindError> {
        if !self.store.is_live(self.entity) {
            return Err(BindError::InvalidEntity(self.entity));
        }

        if let Some(component) = &self.cache[id.0] {
            return Ok(component.clone());
        }

        let (name, spec) = self.slot(id)?;
        let component = match self.store.get_component(self.entity, spec.type_id()) {
            Some(existing) => {
                trace!(entity = %self.entity, slot = name, "slot bound to existing component");
                existing
            }
            None => {
                let created = self
                    .store
                    .create_component(spec.meta(), spec.args())
                    .map_err(|source| BindError::Construction {
                        slot: name.to_string(),
                        source,
                    })?;
                ensure_declared(name, spec, &created)?;
                let attached = self.store.attach(self.entity, created)?;
                trace!(
                    entity = %self.entity,
                    slot = name,
                    component = spec.type_name(),
                    "slot created component"
                );
                attached
            }
        };

        // Only a component of the declared Rust type may enter the cache.
        ensure_declared(name, spec, &component)?;
        self.cache[id.0] = Some(component.clone());
        Ok(component)
    }
}

impl std::fmt::Debug for EntityBinder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let resolved = self.cache.iter().filter(|slot| slot.is_some()).count();
        f.debug_struct("EntityBinder")
            .field("entity", &self.entity)
            .field("kind", &self.registry.kind())
            .field("resolution", &self.resolution)
            .field("resolved", &resolved)
            .field("slots", &self.registry.len())
            .finish()
    }
}

fn ensure_declared(
    name: &str,
    spec: &SlotSpec,
    component: &ErasedComponent,
) -> Result<(), BindError> {
    if spec.meta().matches(component) {
        Ok(())
    } else {
        Err(BindError::ComponentTypeClash {
            slot: name.to_string(),
            component: spec.type_name(),
        })
    }
}

fn downcast<T: Component>(
    name: &str,
    component: &ErasedComponent,
) -> Result<ComponentRef<T>, BindError> {
    component
        .downcast::<T>()
        .ok_or_else(|| BindError::SlotTypeMismatch {
            slot: name.to_string(),
            declared: component.type_name(),
            requested: T::type_name(),
        })
}
