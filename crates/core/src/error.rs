//! Domain error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// A single broken product invariant.
///
/// Raised at construction time, before any product value becomes observable.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("product code cannot be empty")]
    EmptyCode,

    #[error("product name cannot be empty")]
    EmptyName,

    #[error("product category cannot be empty")]
    EmptyCategory,

    #[error("product internal reference cannot be empty")]
    EmptyInternalReference,

    /// Also used for NaN, which is not a usable price either.
    #[error("product price cannot be negative (got {0})")]
    NegativePrice(f64),

    #[error("product quantity cannot be negative (got {0})")]
    NegativeQuantity(i32),

    #[error("product rating must be between 0 and 5 (got {0})")]
    RatingOutOfRange(i32),

    #[error("unknown inventory status '{0}' (expected INSTOCK, LOWSTOCK or OUTOFSTOCK)")]
    UnknownInventoryStatus(String),
}

/// Domain-level error.
///
/// Every variant is a recoverable, caller-facing condition. The transport layer
/// decides how each one is presented; the domain only guarantees they are
/// distinguishable.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A product field set broke an entity invariant.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Identity text was not a canonical UUID.
    #[error("invalid identifier: {0}")]
    MalformedId(String),

    /// The code is already owned by a different product.
    #[error("product with code '{0}' already exists")]
    DuplicateCode(String),

    /// No product exists for the identity.
    #[error("product {0} does not exist")]
    NotFound(ProductId),

    /// The storage adapter failed for a reason outside the domain taxonomy.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn malformed_id(msg: impl Into<String>) -> Self {
        Self::MalformedId(msg.into())
    }

    pub fn duplicate_code(code: impl Into<String>) -> Self {
        Self::DuplicateCode(code.into())
    }

    pub fn not_found(id: ProductId) -> Self {
        Self::NotFound(id)
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
