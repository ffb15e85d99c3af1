//! Strongly-typed product identity.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Length of the canonical dashed form (`8-4-4-4-12` hex digits).
const CANONICAL_LEN: usize = 36;

/// Identifier of a product aggregate.
///
/// Opaque 128-bit value; the textual form is always the lowercase hyphenated
/// UUID representation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Create a new random (v4) identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the canonical `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` form.
    ///
    /// The simple, braced and URN spellings that `uuid` would otherwise accept
    /// are rejected, as is surrounding whitespace.
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        if text.len() != CANONICAL_LEN {
            return Err(DomainError::malformed_id(format!(
                "ProductId: '{text}' is not a canonical UUID"
            )));
        }
        let uuid = Uuid::parse_str(text)
            .map_err(|e| DomainError::malformed_id(format!("ProductId: '{text}': {e}")))?;
        Ok(Self(uuid))
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Bridge for legacy numeric ids: the value lives in the low 64 bits.
    pub fn from_u64(value: u64) -> Self {
        Self(Uuid::from_u64_pair(0, value))
    }

    /// Low 64 bits of the identifier (inverse of [`ProductId::from_u64`]).
    pub fn to_u64(&self) -> u64 {
        self.0.as_u64_pair().1
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl From<Uuid> for ProductId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<ProductId> for Uuid {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

impl FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_canonical_text() {
        let id = ProductId::parse("123e4567-e89b-12d3-a456-426614174000").unwrap();
        assert_eq!(id.to_string(), "123e4567-e89b-12d3-a456-426614174000");
    }

    #[test]
    fn uppercase_input_is_accepted_and_normalised() {
        let id = ProductId::parse("123E4567-E89B-12D3-A456-426614174000").unwrap();
        assert_eq!(id.to_string(), "123e4567-e89b-12d3-a456-426614174000");
    }

    #[test]
    fn rejects_malformed_text() {
        for bad in [
            "not-a-uuid",
            "",
            "123e4567e89b12d3a456426614174000",
            "{123e4567-e89b-12d3-a456-426614174000}",
            "urn:uuid:123e4567-e89b-12d3-a456-426614174000",
            " 123e4567-e89b-12d3-a456-42661417400",
            "123e4567-e89b-12d3-a456-42661417400g",
        ] {
            match ProductId::parse(bad) {
                Err(DomainError::MalformedId(_)) => {}
                other => panic!("expected MalformedId for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn fresh_ids_are_distinct() {
        assert_ne!(ProductId::new(), ProductId::new());
    }

    #[test]
    fn numeric_bridge_keeps_low_bits() {
        let id = ProductId::from_u64(123_456_789);
        assert_eq!(id.to_u64(), 123_456_789);
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-0000075bcd15");
    }

    proptest! {
        #[test]
        fn text_round_trips(bytes in any::<[u8; 16]>()) {
            let id = ProductId::from_uuid(Uuid::from_bytes(bytes));
            prop_assert_eq!(ProductId::parse(&id.to_string()).unwrap(), id);
        }
    }
}
