//! Slot registries — the merged, immutable slot table of an entity kind.
//!
//! A registry is built once per kind, normally inside a `LazyLock` returned
//! from [`EntityKind::slots`](crate::EntityKind::slots), and shared by every
//! instance of that kind.
//!
//! ## Merge order
//!
//! [`SlotRegistryBuilder::build`] composes the table in a fixed order:
//!
//! 1. Each parent registry, left to right as passed to
//!    [`extends`](SlotRegistryBuilder::extends). Parents are already merged, so
//!    transitively inherited slots arrive flattened regardless of diamond
//!    shape. A later parent overrides an earlier one on a name collision.
//! 2. The kind's own declarations, in declaration order. These override any
//!    inherited slot of the same name.
//!
//! Overriding replaces the whole [`SlotSpec`]; fields of two specs are never
//! mixed. A slot keeps the position where its name first appeared, which
//! makes [`SlotId`]s stable between a parent and its children.

use std::any::TypeId;
use std::marker::PhantomData;

use indexmap::IndexMap;
use indexmap::map::Entry;
use kindred_component::Component;
use tracing::debug;

use crate::error::{BindError, DeclarationConflict};
use crate::slot::SlotSpec;

/// Position of a slot within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

/// A declared slot and the kind that declared it.
#[derive(Debug, Clone)]
struct SlotEntry {
    spec: SlotSpec,
    origin: &'static str,
}

/// The merged slot table of one entity kind.
#[derive(Debug)]
pub struct SlotRegistry {
    kind: &'static str,
    parents: Vec<&'static str>,
    slots: IndexMap<String, SlotEntry>,
}

impl SlotRegistry {
    /// Start declaring the slots of `kind`.
    #[must_use]
    pub fn builder(kind: &'static str) -> SlotRegistryBuilder {
        SlotRegistryBuilder {
            kind,
            parents: Vec::new(),
            own: Vec::new(),
        }
    }

    /// The kind this registry belongs to.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Direct parent kinds, in the order they were extended.
    #[must_use]
    pub fn parents(&self) -> &[&'static str] {
        &self.parents
    }

    /// Number of slots, inherited ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the kind declares no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Look up a slot's spec by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SlotSpec> {
        self.slots.get(name).map(|entry| &entry.spec)
    }

    /// Look up a slot's position by name.
    #[must_use]
    pub fn slot_id(&self, name: &str) -> Option<SlotId> {
        self.slots.get_index_of(name).map(SlotId)
    }

    /// Name of the kind whose declaration won for `name`.
    #[must_use]
    pub fn origin(&self, name: &str) -> Option<&'static str> {
        self.slots.get(name).map(|entry| entry.origin)
    }

    /// Slot name and spec at `id`.
    #[must_use]
    pub fn slot_at(&self, id: SlotId) -> Option<(&str, &SlotSpec)> {
        self.slots
            .get_index(id.0)
            .map(|(name, entry)| (name.as_str(), &entry.spec))
    }

    /// Iterate over `(name, spec)` pairs in merge order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SlotSpec)> {
        self.slots
            .iter()
            .map(|(name, entry)| (name.as_str(), &entry.spec))
    }

    /// Build a typed key for slot `name`, checking that it holds a `T`.
    ///
    /// Keys skip the name lookup and type check on every access, which
    /// matters for slots read once per tick.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::UnknownSlot`] if no such slot exists and
    /// [`BindError::SlotTypeMismatch`] if it holds another component type.
    pub fn key<T: Component>(&'static self, name: &str) -> Result<SlotKey<T>, BindError> {
        let (index, slot, entry) =
            self.slots
                .get_full(name)
                .ok_or_else(|| BindError::UnknownSlot {
                    kind: self.kind,
                    slot: name.to_string(),
                })?;
        check_type::<T>(name, &entry.spec)?;
        Ok(SlotKey {
            id: SlotId(index),
            name: slot.as_str(),
            kind: self.kind,
            registry: self as *const SlotRegistry as usize,
            _component: PhantomData,
        })
    }

    /// Returns `true` if `key` was created from this registry.
    pub(crate) fn owns<T>(&self, key: &SlotKey<T>) -> bool {
        key.registry == self as *const SlotRegistry as usize
    }
}

/// Fails unless `spec` declares component type `T`.
pub(crate) fn check_type<T: Component>(name: &str, spec: &SlotSpec) -> Result<(), BindError> {
    if spec.meta().rust_type == TypeId::of::<T>() {
        Ok(())
    } else {
        Err(BindError::SlotTypeMismatch {
            slot: name.to_string(),
            declared: spec.type_name(),
            requested: T::type_name(),
        })
    }
}

/// A pre-validated, typed handle to one slot of one registry.
pub struct SlotKey<T> {
    id: SlotId,
    name: &'static str,
    kind: &'static str,
    /// Address of the owning registry. Registries live in statics, so the
    /// address identifies the kind for the life of the program.
    registry: usize,
    _component: PhantomData<fn() -> T>,
}

impl<T> SlotKey<T> {
    /// The slot's position.
    #[must_use]
    pub fn id(&self) -> SlotId {
        self.id
    }

    /// The slot's name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The kind the key was created for.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl<T> Clone for SlotKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SlotKey<T> {}

impl<T> std::fmt::Debug for SlotKey<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotKey")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Collects a kind's parents and own slot declarations.
#[derive(Debug)]
pub struct SlotRegistryBuilder {
    kind: &'static str,
    parents: Vec<&'static SlotRegistry>,
    own: Vec<(String, SlotSpec)>,
}

impl SlotRegistryBuilder {
    /// Inherit every slot of `parent`. Call once per parent, in base-list
    /// order.
    #[must_use]
    pub fn extends(mut self, parent: &'static SlotRegistry) -> Self {
        self.parents.push(parent);
        self
    }

    /// Declare a slot on this kind.
    #[must_use]
    pub fn slot(mut self, name: impl Into<String>, spec: SlotSpec) -> Self {
        self.own.push((name.into(), spec));
        self
    }

    /// Merge parents and own declarations, resolving every name collision
    /// by override.
    #[must_use]
    pub fn build(self) -> SlotRegistry {
        let mut slots: IndexMap<String, SlotEntry> = IndexMap::new();

        for parent in &self.parents {
            for (name, entry) in &parent.slots {
                if let Some(previous) = slots.insert(name.clone(), entry.clone())
                    && previous.spec != entry.spec
                {
                    debug!(
                        kind = self.kind,
                        slot = %name,
                        from = previous.origin,
                        to = entry.origin,
                        "inherited slot overridden by later parent"
                    );
                }
            }
        }

        for (name, spec) in self.own {
            let entry = SlotEntry {
                spec,
                origin: self.kind,
            };
            if let Some(previous) = slots.insert(name.clone(), entry) {
                debug!(
                    kind = self.kind,
                    slot = %name,
                    from = previous.origin,
                    "slot overrides earlier declaration"
                );
            }
        }

        debug!(kind = self.kind, slots = slots.len(), "slot registry built");

        SlotRegistry {
            kind: self.kind,
            parents: self.parents.iter().map(|p| p.kind).collect(),
            slots,
        }
    }

    /// Like [`build`](Self::build), but rejects silent collisions.
    ///
    /// Two parents contributing different specs under one name is a
    /// [`DeclarationConflict`] unless the kind declares that name itself, in
    /// which case its own declaration settles the question. Declaring the same
    /// name twice on one kind is always a conflict. The same spec reached
    /// through several parents (a diamond) is accepted.
    ///
    /// # Errors
    ///
    /// Returns the first conflict found, in merge order.
    pub fn build_strict(self) -> Result<SlotRegistry, DeclarationConflict> {
        let mut own_names: Vec<&str> = Vec::with_capacity(self.own.len());
        for (name, _) in &self.own {
            if own_names.contains(&name.as_str()) {
                return Err(DeclarationConflict {
                    kind: self.kind,
                    slot: name.clone(),
                    first: self.kind,
                    second: self.kind,
                });
            }
            own_names.push(name);
        }

        let mut seen: IndexMap<&str, &SlotEntry> = IndexMap::new();
        for parent in &self.parents {
            for (name, entry) in &parent.slots {
                if own_names.contains(&name.as_str()) {
                    continue;
                }
                match seen.entry(name.as_str()) {
                    Entry::Vacant(vacant) => {
                        vacant.insert(entry);
                    }
                    Entry::Occupied(occupied) if occupied.get().spec != entry.spec => {
                        return Err(DeclarationConflict {
                            kind: self.kind,
                            slot: name.clone(),
                            first: occupied.get().origin,
                            second: entry.origin,
                        });
                    }
                    Entry::Occupied(_) => {}
                }
            }
        }

        Ok(self.build())
    }
}
