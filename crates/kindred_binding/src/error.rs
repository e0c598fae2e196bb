//! Binding error types.

use kindred_component::{ConstructionError, Entity, StoreError};

/// Two declarations claim the same slot name and neither overrides the other.
///
/// Only produced by
/// [`SlotRegistryBuilder::build_strict`](crate::SlotRegistryBuilder::build_strict).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error(
    "kind '{kind}' inherits conflicting declarations of slot '{slot}' \
     from '{first}' and '{second}'"
)]
pub struct DeclarationConflict {
    /// The kind being declared.
    pub kind: &'static str,
    /// The contested slot name.
    pub slot: String,
    /// Where the earlier declaration came from.
    pub first: &'static str,
    /// Where the later declaration came from.
    pub second: &'static str,
}

/// Errors raised while resolving declared slots on an entity.
///
/// Failures are never recovered locally: a failed resolution leaves the slot
/// unresolved and the error propagates to the kind's own code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindError {
    /// The slot's declared arguments do not fit its component constructor.
    #[error("slot '{slot}': {source}")]
    Construction {
        /// The slot being resolved.
        slot: String,
        /// The underlying construction failure.
        #[source]
        source: ConstructionError,
    },

    /// The wrapped entity is no longer live in the store.
    #[error("{0} is no longer live")]
    InvalidEntity(Entity),

    /// The kind declares no slot with this name.
    #[error("kind '{kind}' has no slot named '{slot}'")]
    UnknownSlot {
        /// The kind that was asked.
        kind: &'static str,
        /// The requested slot name.
        slot: String,
    },

    /// The slot was requested as a different component type than declared.
    #[error("slot '{slot}' holds '{declared}', not '{requested}'")]
    SlotTypeMismatch {
        /// The slot name.
        slot: String,
        /// The declared component type.
        declared: &'static str,
        /// The requested component type.
        requested: &'static str,
    },

    /// A slot key built for one kind was used on a binder of another kind.
    #[error("slot key '{slot}' belongs to kind '{key_kind}', not '{kind}'")]
    ForeignSlotKey {
        /// The slot name carried by the key.
        slot: String,
        /// The kind the key was created for.
        key_kind: &'static str,
        /// The kind of the binder it was used with.
        kind: &'static str,
    },

    /// The entity carries a component under the slot's type name, but of a
    /// different Rust type than the one declared.
    #[error("slot '{slot}': entity carries a foreign component named '{component}'")]
    ComponentTypeClash {
        /// The slot name.
        slot: String,
        /// The shared component name.
        component: &'static str,
    },

    /// No constructor is registered for this kind name.
    #[error("no constructor registered for kind '{0}'")]
    UnknownKind(String),

    /// The store refused an operation.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for BindError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidEntity(entity) => Self::InvalidEntity(entity),
            other => Self::Store(other),
        }
    }
}
