//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Natural (business) key the entity is looked up by, e.g. a SKU.
    ///
    /// Unlike `id`, which is assigned by the store on creation, the natural key
    /// is known up front and is what seeding uses to decide whether the entity
    /// already exists.
    fn natural_key(&self) -> &str;
}
