//! Core [`Component`] trait and associated metadata.
//!
//! Every value a store can attach to an entity implements [`Component`]. A
//! component type knows its name, the ordered names of its constructor
//! parameters, and how to build itself from a [`ComponentArgs`] bundle.
//!
//! ## Type Identity
//!
//! [`ComponentTypeId`] is derived from the component's **string name** using
//! the FNV-1a 64-bit hash algorithm. The ID is deterministic across builds and
//! processes, so slot tables can be compared and logged without relying on
//! `std::any::TypeId`.
//!
//! Names are chosen by component authors, so two Rust types may share one.
//! [`ComponentMeta`] and [`ErasedComponent`] also carry the Rust `TypeId`, and
//! [`ComponentMeta::matches`] tells a component of the declared type apart
//! from a same-named stranger.

use std::any::TypeId;
use std::fmt;

use serde::de::DeserializeOwned;

use crate::args::ComponentArgs;
use crate::error::ConstructionError;
use crate::store::ErasedComponent;

/// A unique identifier for a component type, derived from its string name
/// using the FNV-1a 64-bit hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentTypeId`] from a component's string name.
    ///
    /// # Algorithm (FNV-1a 64-bit)
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325          (offset basis)
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3  (prime)
    /// return hash
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the [`ComponentTypeId`] for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Builds a type-erased component from constructor arguments.
pub type ConstructFn = fn(&ComponentArgs) -> Result<ErasedComponent, ConstructionError>;

/// Metadata about a component type.
///
/// This is all a declaration needs to identify and instantiate a component
/// without being generic over it.
#[derive(Clone, Copy)]
pub struct ComponentMeta {
    /// The unique type identifier.
    pub type_id: ComponentTypeId,
    /// The human-readable name of the component (e.g. `"Position"`).
    pub name: &'static str,
    /// The concrete Rust type.
    pub rust_type: TypeId,
    /// Construct a fresh instance from stored arguments.
    pub construct_fn: ConstructFn,
}

impl ComponentMeta {
    /// Run the constructor against `args`.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError`] when the arguments do not fit the
    /// component's constructor.
    pub fn construct(&self, args: &ComponentArgs) -> Result<ErasedComponent, ConstructionError> {
        (self.construct_fn)(args)
    }

    /// Returns `true` if `component` is of this exact Rust type, not merely
    /// of a type with the same name.
    #[must_use]
    pub fn matches(&self, component: &ErasedComponent) -> bool {
        component.type_id() == self.type_id && component.rust_type() == self.rust_type
    }
}

impl fmt::Debug for ComponentMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentMeta")
            .field("type_id", &self.type_id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ComponentMeta {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.rust_type == other.rust_type
    }
}

impl Eq for ComponentMeta {}

/// The core component trait.
///
/// The default [`Component::construct`] deserializes the component from its
/// arguments with `serde`, so most components only derive `Deserialize` and
/// name themselves.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use kindred_component::{Component, ComponentArgs};
///
/// #[derive(Debug, Deserialize)]
/// #[serde(default)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// impl Default for Position {
///     fn default() -> Self {
///         Self { x: 0.0, y: 0.0 }
///     }
/// }
///
/// impl Component for Position {
///     const FIELDS: &'static [&'static str] = &["x", "y"];
///
///     fn type_name() -> &'static str { "Position" }
/// }
///
/// let p = Position::construct(&ComponentArgs::new().arg(3.0)).unwrap();
/// assert_eq!((p.x, p.y), (3.0, 0.0));
/// ```
pub trait Component: Sized + 'static + DeserializeOwned {
    /// Ordered constructor parameter names. Positional arguments bind to these
    /// in order. Leave empty for components that only take keyword
    /// arguments or a plain sequence.
    const FIELDS: &'static [&'static str] = &[];

    /// A human-readable name for this component type.
    fn type_name() -> &'static str;

    /// Returns the [`ComponentTypeId`] for this component.
    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }

    /// Build an instance from constructor arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError`] when the arguments cannot be bound to
    /// [`Component::FIELDS`] or do not deserialize into `Self`.
    fn construct(args: &ComponentArgs) -> Result<Self, ConstructionError> {
        let value = args
            .to_value(Self::FIELDS)
            .map_err(|message| ConstructionError::new(Self::type_name(), message))?;
        serde_json::from_value(value)
            .map_err(|e| ConstructionError::new(Self::type_name(), e.to_string()))
    }

    /// Returns the [`ComponentMeta`] descriptor for this component type.
    fn meta() -> ComponentMeta {
        ComponentMeta {
            type_id: Self::component_type_id(),
            name: Self::type_name(),
            rust_type: TypeId::of::<Self>(),
            construct_fn: |args| Self::construct(args).map(ErasedComponent::new),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Health {
        current: f32,
        max: f32,
    }

    impl Component for Health {
        const FIELDS: &'static [&'static str] = &["current", "max"];

        fn type_name() -> &'static str {
            "Health"
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Extent(f32, f32);

    impl Component for Extent {
        fn type_name() -> &'static str {
            "Extent"
        }
    }

    #[test]
    fn test_component_type_id_matches_from_name() {
        assert_eq!(Health::component_type_id(), ComponentTypeId::from_name("Health"));
        assert_eq!(ComponentTypeId::of::<Health>(), Health::component_type_id());
    }

    #[test]
    fn test_component_type_id_differs_between_types() {
        assert_ne!(Health::component_type_id(), Extent::component_type_id());
    }

    #[test]
    fn test_fnv1a_known_vector() {
        // FNV-1a 64-bit of empty string is the offset basis itself.
        assert_eq!(
            ComponentTypeId::from_name(""),
            ComponentTypeId(0xcbf2_9ce4_8422_2325)
        );
    }

    #[test]
    fn test_construct_from_positional_args() {
        let health = Health::construct(&ComponentArgs::new().arg(80.0).arg(100.0)).unwrap();
        assert_eq!(
            health,
            Health {
                current: 80.0,
                max: 100.0
            }
        );
    }

    #[test]
    fn test_construct_mixes_positional_and_keyword() {
        let args = ComponentArgs::new().arg(10.0).kwarg("max", 50.0);
        let health = Health::construct(&args).unwrap();
        assert_eq!(health.current, 10.0);
        assert_eq!(health.max, 50.0);
    }

    #[test]
    fn test_construct_missing_field_fails() {
        let err = Health::construct(&ComponentArgs::new().arg(10.0)).unwrap_err();
        assert_eq!(err.component, "Health");
        assert!(err.message.contains("max"));
    }

    #[test]
    fn test_construct_wrong_type_fails() {
        let args = ComponentArgs::new().kwarg("current", "lots").kwarg("max", 1.0);
        assert!(Health::construct(&args).is_err());
    }

    #[test]
    fn test_construct_tuple_struct_from_sequence() {
        let extent = Extent::construct(&ComponentArgs::new().arg(2.0).arg(4.0)).unwrap();
        assert_eq!(extent, Extent(2.0, 4.0));
    }

    #[test]
    fn test_keyword_args_without_fields_need_named_struct() {
        let args = ComponentArgs::new().arg(2.0).kwarg("h", 4.0);
        let err = Extent::construct(&args).unwrap_err();
        assert_eq!(err.component, "Extent");
    }

    #[test]
    fn test_meta_constructs_erased_component() {
        let meta = Health::meta();
        assert_eq!(meta.name, "Health");
        let erased = meta
            .construct(&ComponentArgs::new().kwarg("current", 1.0).kwarg("max", 2.0))
            .unwrap();
        assert_eq!(erased.type_id(), Health::component_type_id());
        let health = erased.downcast::<Health>().unwrap();
        assert_eq!(health.borrow().max, 2.0);
        assert!(meta.matches(&erased));
    }

    #[derive(Debug, Deserialize)]
    struct FakeHealth;

    impl Component for FakeHealth {
        fn type_name() -> &'static str {
            "Health"
        }
    }

    #[test]
    fn test_same_name_different_type_does_not_match() {
        assert_eq!(FakeHealth::component_type_id(), Health::component_type_id());
        assert_ne!(FakeHealth::meta(), Health::meta());
        let fake = ErasedComponent::new(FakeHealth);
        assert!(!Health::meta().matches(&fake));
        assert!(FakeHealth::meta().matches(&fake));
    }
}
