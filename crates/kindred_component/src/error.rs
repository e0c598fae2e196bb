//! Component and store error types.

use crate::entity::Entity;

/// A component could not be built from its declared arguments.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot construct component '{component}': {message}")]
pub struct ConstructionError {
    /// Name of the component type being constructed.
    pub component: &'static str,
    /// What went wrong, as reported by argument binding or deserialization.
    pub message: String,
}

impl ConstructionError {
    /// Create a construction error for `component`.
    #[must_use]
    pub fn new(component: &'static str, message: impl Into<String>) -> Self {
        Self {
            component,
            message: message.into(),
        }
    }
}

/// Errors raised by a [`ComponentStore`](crate::ComponentStore) when mutating
/// an entity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The entity handle no longer refers to a live entity.
    #[error("{0} is not a live entity")]
    InvalidEntity(Entity),

    /// Every entity index is in use or retired.
    #[error("entity space exhausted")]
    Exhausted,

    /// The store refused to attach a component.
    #[error("store rejected component '{component}' on {entity}: {reason}")]
    Rejected {
        /// The target entity.
        entity: Entity,
        /// Name of the rejected component type.
        component: &'static str,
        /// Store-specific reason.
        reason: String,
    },
}
