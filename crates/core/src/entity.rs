//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Name of the entity set in the external store (used in logs and queries).
    const ENTITY_TYPE: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
