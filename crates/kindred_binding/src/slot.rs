//! Slot declarations.

use kindred_component::{Component, ComponentArgs, ComponentMeta, ComponentTypeId};
use serde_json::Value;

/// What a slot holds: a component type and the arguments to build it with.
///
/// Immutable once placed in a registry. Two specs are equal when they name
/// the same component type with the same arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSpec {
    meta: ComponentMeta,
    args: ComponentArgs,
}

impl SlotSpec {
    /// Declare a slot of component type `T` with no constructor arguments.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_meta(T::meta())
    }

    /// Declare a slot from type-erased component metadata.
    #[must_use]
    pub fn from_meta(meta: ComponentMeta) -> Self {
        Self {
            meta,
            args: ComponentArgs::new(),
        }
    }

    /// Append a positional constructor argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args = self.args.arg(value);
        self
    }

    /// Set a keyword constructor argument.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args = self.args.kwarg(name, value);
        self
    }

    /// The declared component type.
    #[must_use]
    pub fn type_id(&self) -> ComponentTypeId {
        self.meta.type_id
    }

    /// The declared component's name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.meta.name
    }

    /// Component metadata, including its constructor.
    #[must_use]
    pub fn meta(&self) -> &ComponentMeta {
        &self.meta
    }

    /// The stored constructor arguments.
    #[must_use]
    pub fn args(&self) -> &ComponentArgs {
        &self.args
    }
}
