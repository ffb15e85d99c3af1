use std::collections::HashMap;
use std::sync::RwLock;

use catalog_core::{Entity, ProductId};
use catalog_products::{Product, ProductRepository, RepositoryError};

/// In-memory product store for tests/dev.
///
/// `save` checks code ownership under the write lock, so two racing creates
/// with the same code cannot both land even though the service-level check is
/// not atomic with the write.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    records: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.records.read().map_err(|_| poisoned())?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::backend("lock poisoned")
}

impl ProductRepository for InMemoryProductRepository {
    fn save(&self, product: Product) -> Result<Product, RepositoryError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;

        if records
            .values()
            .any(|p| p.code() == product.code() && p.id() != product.id())
        {
            return Err(RepositoryError::DuplicateCode(product.code().to_string()));
        }

        records.insert(*product.id(), product.clone());
        Ok(product)
    }

    fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(id).cloned())
    }

    fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.values().cloned().collect())
    }

    fn delete_by_id(&self, id: &ProductId) -> Result<(), RepositoryError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.remove(id);
        Ok(())
    }

    fn exists_by_code(&self, code: &str) -> Result<bool, RepositoryError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.values().any(|p| p.code() == code))
    }

    fn exists_by_code_excluding(
        &self,
        code: &str,
        id: &ProductId,
    ) -> Result<bool, RepositoryError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.values().any(|p| p.code() == code && p.id() != id))
    }
}
