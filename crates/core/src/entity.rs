//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Two entities with the same id are the same record, even if their attributes
/// differ (e.g. before and after an update).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Whether `other` refers to the same record as `self`.
    fn same_identity_as(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
