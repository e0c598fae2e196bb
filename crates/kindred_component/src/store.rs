//! The [`ComponentStore`] capability and shared component references.
//!
//! Stores own entities and their components. Callers only ever hold shared
//! references ([`ComponentRef`] or the type-erased [`ErasedComponent`]), so
//! dropping a reference never destroys the component or its entity.
//!
//! The store model is single-threaded: every method takes `&self` and stores
//! use interior mutability for attachment.

use std::any::{Any, TypeId};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::args::ComponentArgs;
use crate::component::{Component, ComponentMeta, ComponentTypeId};
use crate::entity::Entity;
use crate::error::{ConstructionError, StoreError};

/// A shared, typed reference to a component owned by a store.
pub struct ComponentRef<T>(Rc<RefCell<T>>);

impl<T> ComponentRef<T> {
    /// Immutably borrow the component.
    ///
    /// # Panics
    ///
    /// Panics if the component is currently mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Mutably borrow the component.
    ///
    /// # Panics
    ///
    /// Panics if the component is currently borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Returns `true` if both references point at the same component.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for ComponentRef<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for ComponentRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(value) => f.debug_tuple("ComponentRef").field(&*value).finish(),
            Err(_) => f.write_str("ComponentRef(<borrowed>)"),
        }
    }
}

/// A type-erased shared component.
///
/// Holds an `Rc<RefCell<T>>` behind `dyn Any` together with the component's
/// identity, so stores and slot caches can keep components of any type in a
/// single collection.
#[derive(Clone)]
pub struct ErasedComponent {
    type_id: ComponentTypeId,
    name: &'static str,
    rust_type: TypeId,
    value: Rc<dyn Any>,
}

impl ErasedComponent {
    /// Wrap a freshly constructed component.
    #[must_use]
    pub fn new<T: Component>(value: T) -> Self {
        Self {
            type_id: T::component_type_id(),
            name: T::type_name(),
            rust_type: TypeId::of::<T>(),
            value: Rc::new(RefCell::new(value)),
        }
    }

    /// The component's type identifier.
    #[must_use]
    pub fn type_id(&self) -> ComponentTypeId {
        self.type_id
    }

    /// The component's type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.name
    }

    /// The concrete Rust type behind the component.
    #[must_use]
    pub fn rust_type(&self) -> TypeId {
        self.rust_type
    }

    /// Recover a typed reference, or `None` if the component is not a `T`.
    #[must_use]
    pub fn downcast<T: Component>(&self) -> Option<ComponentRef<T>> {
        Rc::clone(&self.value)
            .downcast::<RefCell<T>>()
            .ok()
            .map(ComponentRef)
    }

    /// Returns `true` if both handles point at the same component.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.value, &other.value)
    }
}

impl<T: Component> From<ComponentRef<T>> for ErasedComponent {
    fn from(component: ComponentRef<T>) -> Self {
        Self {
            type_id: T::component_type_id(),
            name: T::type_name(),
            rust_type: TypeId::of::<T>(),
            value: component.0,
        }
    }
}

impl fmt::Debug for ErasedComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedComponent")
            .field("type_id", &self.type_id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The capability a store must provide to have components bound onto its
/// entities.
///
/// A component is uniquely identified within a store by its
/// `(entity, component type)` pair.
pub trait ComponentStore {
    /// Returns `true` if `entity` still refers to a live entity.
    fn is_live(&self, entity: Entity) -> bool;

    /// Returns `true` if `entity` carries a component of type `type_id`.
    fn has_component(&self, entity: Entity, type_id: ComponentTypeId) -> bool;

    /// Look up the component of type `type_id` on `entity`.
    fn get_component(&self, entity: Entity, type_id: ComponentTypeId) -> Option<ErasedComponent>;

    /// Construct a new, unattached component.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError`] if `args` do not fit the component's
    /// constructor.
    fn create_component(
        &self,
        meta: &ComponentMeta,
        args: &ComponentArgs,
    ) -> Result<ErasedComponent, ConstructionError> {
        meta.construct(args)
    }

    /// Attach `component` to `entity`, returning the stored reference.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidEntity`] if `entity` is not live.
    fn attach(
        &self,
        entity: Entity,
        component: ErasedComponent,
    ) -> Result<ErasedComponent, StoreError>;
}

impl<S: ComponentStore + ?Sized> ComponentStore for &S {
    fn is_live(&self, entity: Entity) -> bool {
        (**self).is_live(entity)
    }

    fn has_component(&self, entity: Entity, type_id: ComponentTypeId) -> bool {
        (**self).has_component(entity, type_id)
    }

    fn get_component(&self, entity: Entity, type_id: ComponentTypeId) -> Option<ErasedComponent> {
        (**self).get_component(entity, type_id)
    }

    fn create_component(
        &self,
        meta: &ComponentMeta,
        args: &ComponentArgs,
    ) -> Result<ErasedComponent, ConstructionError> {
        (**self).create_component(meta, args)
    }

    fn attach(
        &self,
        entity: Entity,
        component: ErasedComponent,
    ) -> Result<ErasedComponent, StoreError> {
        (**self).attach(entity, component)
    }
}
