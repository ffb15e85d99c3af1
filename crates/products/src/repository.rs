//! Storage port for product aggregates.
//!
//! The lifecycle service only talks to storage through [`ProductRepository`].
//! Adapters (in-memory, Postgres) live in `catalog-infra`.

use std::sync::Arc;

use catalog_core::{DomainError, Entity, ProductId};
use thiserror::Error;

use crate::product::Product;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The store's own uniqueness guard rejected the write.
    #[error("code '{0}' is already taken")]
    DuplicateCode(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl RepositoryError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

impl From<RepositoryError> for DomainError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateCode(code) => DomainError::DuplicateCode(code),
            RepositoryError::Backend(msg) => DomainError::Storage(msg),
        }
    }
}

/// Persistence boundary for products.
///
/// Calls are synchronous. Nothing here is atomic across calls: a check followed
/// by a write can race with another caller unless the implementation guards
/// `save` itself.
pub trait ProductRepository: Send + Sync {
    /// Insert, or overwrite the record with the same id. Returns the stored state.
    fn save(&self, product: Product) -> Result<Product, RepositoryError>;

    fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Every stored product, in no particular order.
    fn find_all(&self) -> Result<Vec<Product>, RepositoryError>;

    fn delete_by_id(&self, id: &ProductId) -> Result<(), RepositoryError>;

    fn exists_by_code(&self, code: &str) -> Result<bool, RepositoryError>;

    /// Whether a product other than `id` owns `code`.
    ///
    /// The default scans [`find_all`](Self::find_all); adapters with an index
    /// should override it with a targeted query.
    fn exists_by_code_excluding(
        &self,
        code: &str,
        id: &ProductId,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .find_all()?
            .iter()
            .any(|p| p.code() == code && p.id() != id))
    }
}

impl<R> ProductRepository for Arc<R>
where
    R: ProductRepository + ?Sized,
{
    fn save(&self, product: Product) -> Result<Product, RepositoryError> {
        (**self).save(product)
    }

    fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        (**self).find_all()
    }

    fn delete_by_id(&self, id: &ProductId) -> Result<(), RepositoryError> {
        (**self).delete_by_id(id)
    }

    fn exists_by_code(&self, code: &str) -> Result<bool, RepositoryError> {
        (**self).exists_by_code(code)
    }

    fn exists_by_code_excluding(
        &self,
        code: &str,
        id: &ProductId,
    ) -> Result<bool, RepositoryError> {
        (**self).exists_by_code_excluding(code, id)
    }
}
