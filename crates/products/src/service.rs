//! Product lifecycle service.
//!
//! Stateless orchestrator between callers and the storage port. It validates by
//! constructing the aggregate, consults storage for existence and code
//! uniqueness, stamps timestamps, and persists.

use catalog_core::{Clock, DomainError, DomainResult, Entity, ProductId, SystemClock};
use tracing::{info, instrument, warn};

use crate::product::{Product, ProductFields};
use crate::repository::ProductRepository;

/// Caller-supplied product: optional identity text plus every attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub id: Option<String>,
    pub fields: ProductFields,
}

impl ProductDraft {
    pub fn new(fields: ProductFields) -> Self {
        Self { id: None, fields }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Identity text, if any non-blank text was supplied.
    fn id_text(&self) -> Option<&str> {
        self.id.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Create/update/delete/query use cases over a [`ProductRepository`].
///
/// Holds no mutable state of its own, so one instance can be shared by any
/// number of concurrent callers.
#[derive(Debug, Clone)]
pub struct ProductService<R, C = SystemClock> {
    repository: R,
    clock: C,
}

impl<R> ProductService<R, SystemClock>
where
    R: ProductRepository,
{
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            clock: SystemClock,
        }
    }
}

impl<R, C> ProductService<R, C>
where
    R: ProductRepository,
    C: Clock,
{
    pub fn with_clock(repository: R, clock: C) -> Self {
        Self { repository, clock }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Register a new product.
    ///
    /// Blank or absent identity text gets a fresh id. Zero timestamps are
    /// stamped with the current time; caller-supplied ones are kept.
    #[instrument(skip(self, draft), fields(code = %draft.fields.code), err)]
    pub fn create(&self, draft: ProductDraft) -> DomainResult<Product> {
        let id = match draft.id_text() {
            Some(text) => ProductId::parse(text)?,
            None => ProductId::new(),
        };
        let mut product = Product::new(id, draft.fields)?;

        if self.repository.exists_by_code(product.code())? {
            warn!(code = %product.code(), "rejecting create: code already in use");
            return Err(DomainError::duplicate_code(product.code()));
        }

        let now = self.clock.now_millis();
        if product.created_at() == 0 {
            product.set_created_at(now);
        }
        if product.updated_at() == 0 {
            product.set_updated_at(now);
        }

        let saved = self.repository.save(product)?;
        info!(product_id = %saved.id(), "product created");
        Ok(saved)
    }

    /// Replace every attribute of an existing product.
    ///
    /// The stored `created_at` is kept. `updated_at` always moves forward, even
    /// if the clock reads the same millisecond as the previous write.
    #[instrument(skip(self, draft), fields(code = %draft.fields.code), err)]
    pub fn update(&self, draft: ProductDraft) -> DomainResult<Product> {
        let id = match draft.id_text() {
            Some(text) => ProductId::parse(text)?,
            None => {
                return Err(DomainError::malformed_id(
                    "an identity is required to update a product",
                ));
            }
        };
        let mut product = Product::new(id, draft.fields)?;

        let existing = self
            .repository
            .find_by_id(&id)?
            .ok_or(DomainError::not_found(id))?;

        if self
            .repository
            .exists_by_code_excluding(product.code(), &id)?
        {
            warn!(product_id = %id, code = %product.code(), "rejecting update: code owned by another product");
            return Err(DomainError::duplicate_code(product.code()));
        }

        let floor = existing
            .updated_at()
            .max(existing.created_at())
            .saturating_add(1);
        product.set_created_at(existing.created_at());
        product.set_updated_at(self.clock.now_millis().max(floor));

        let saved = self.repository.save(product)?;
        info!(product_id = %saved.id(), "product updated");
        Ok(saved)
    }

    #[instrument(skip(self), err)]
    pub fn delete_by_id(&self, id: &str) -> DomainResult<()> {
        let id = ProductId::parse(id)?;
        self.remove(&id)
    }

    /// Delete by an already-parsed identity.
    #[instrument(skip(self), fields(product_id = %id), err)]
    pub fn remove(&self, id: &ProductId) -> DomainResult<()> {
        if self.repository.find_by_id(id)?.is_none() {
            warn!(product_id = %id, "rejecting delete: product does not exist");
            return Err(DomainError::not_found(*id));
        }
        self.repository.delete_by_id(id)?;
        info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Absence is `Ok(None)`, not an error.
    #[instrument(skip(self), err)]
    pub fn get_by_id(&self, id: &str) -> DomainResult<Option<Product>> {
        let id = ProductId::parse(id)?;
        self.find(&id)
    }

    pub fn find(&self, id: &ProductId) -> DomainResult<Option<Product>> {
        Ok(self.repository.find_by_id(id)?)
    }

    /// Every product, in storage order.
    pub fn get_all(&self) -> DomainResult<Vec<Product>> {
        Ok(self.repository.find_all()?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier, Mutex};

    use catalog_core::{ManualClock, ValidationError};

    use super::*;
    use crate::product::tests::valid_fields;
    use crate::repository::RepositoryError;

    /// Map-backed repository that counts calls, standing in for a mock.
    #[derive(Default)]
    struct RecordingRepository {
        records: Mutex<HashMap<ProductId, Product>>,
        enforce_unique_code: bool,
        exists_barrier: Option<Arc<Barrier>>,
        save_calls: AtomicUsize,
        delete_calls: AtomicUsize,
        find_all_calls: AtomicUsize,
    }

    impl RecordingRepository {
        fn enforcing() -> Self {
            Self {
                enforce_unique_code: true,
                ..Self::default()
            }
        }

        fn with_exists_barrier(mut self, barrier: Arc<Barrier>) -> Self {
            self.exists_barrier = Some(barrier);
            self
        }

        fn seed(&self, product: Product) {
            self.records
                .lock()
                .unwrap()
                .insert(*product.id(), product);
        }

        fn saves(&self) -> usize {
            self.save_calls.load(Ordering::SeqCst)
        }

        fn deletes(&self) -> usize {
            self.delete_calls.load(Ordering::SeqCst)
        }
    }

    impl ProductRepository for RecordingRepository {
        fn save(&self, product: Product) -> Result<Product, RepositoryError> {
            self.save_calls.fetch_add(1, Ordering::SeqCst);
            let mut records = self.records.lock().unwrap();
            if self.enforce_unique_code
                && records
                    .values()
                    .any(|p| p.code() == product.code() && p.id() != product.id())
            {
                return Err(RepositoryError::DuplicateCode(product.code().to_string()));
            }
            records.insert(*product.id(), product.clone());
            Ok(product)
        }

        fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
            Ok(self.records.lock().unwrap().get(id).cloned())
        }

        fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
            self.find_all_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.lock().unwrap().values().cloned().collect())
        }

        fn delete_by_id(&self, id: &ProductId) -> Result<(), RepositoryError> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            self.records.lock().unwrap().remove(id);
            Ok(())
        }

        fn exists_by_code(&self, code: &str) -> Result<bool, RepositoryError> {
            let exists = self
                .records
                .lock()
                .unwrap()
                .values()
                .any(|p| p.code() == code);
            if let Some(barrier) = &self.exists_barrier {
                barrier.wait();
            }
            Ok(exists)
        }
    }

    struct FailingRepository;

    impl ProductRepository for FailingRepository {
        fn save(&self, _product: Product) -> Result<Product, RepositoryError> {
            Err(RepositoryError::backend("connection reset"))
        }
        fn find_by_id(&self, _id: &ProductId) -> Result<Option<Product>, RepositoryError> {
            Err(RepositoryError::backend("connection reset"))
        }
        fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
            Err(RepositoryError::backend("connection reset"))
        }
        fn delete_by_id(&self, _id: &ProductId) -> Result<(), RepositoryError> {
            Err(RepositoryError::backend("connection reset"))
        }
        fn exists_by_code(&self, _code: &str) -> Result<bool, RepositoryError> {
            Err(RepositoryError::backend("connection reset"))
        }
    }

    const T0: i64 = 1_700_000_000_000;

    fn service() -> ProductService<Arc<RecordingRepository>, Arc<ManualClock>> {
        ProductService::with_clock(
            Arc::new(RecordingRepository::default()),
            Arc::new(ManualClock::new(T0)),
        )
    }

    fn stored(code: &str, created_at: i64) -> Product {
        let mut fields = valid_fields(code);
        fields.created_at = created_at;
        fields.updated_at = created_at;
        Product::new(ProductId::new(), fields).unwrap()
    }

    #[test]
    fn create_stamps_timestamps_and_saves_once() {
        let svc = service();
        let product = svc.create(ProductDraft::new(valid_fields("P-100"))).unwrap();

        assert_eq!(product.code(), "P-100");
        assert_eq!(product.created_at(), T0);
        assert_eq!(product.updated_at(), T0);
        assert_eq!(svc.repository().saves(), 1);
        assert_eq!(svc.find(product.id()).unwrap(), Some(product));
    }

    #[test]
    fn create_keeps_caller_supplied_timestamps() {
        let svc = service();
        let mut fields = valid_fields("P-101");
        fields.created_at = 10;
        fields.updated_at = 20;
        let product = svc.create(ProductDraft::new(fields)).unwrap();
        assert_eq!((product.created_at(), product.updated_at()), (10, 20));
    }

    #[test]
    fn create_uses_supplied_identity() {
        let svc = service();
        let draft = ProductDraft::new(valid_fields("P-102"))
            .with_id("123e4567-e89b-12d3-a456-426614174000");
        let product = svc.create(draft).unwrap();
        assert_eq!(product.id().to_string(), "123e4567-e89b-12d3-a456-426614174000");
    }

    #[test]
    fn create_with_blank_identity_generates_one() {
        let svc = service();
        let a = svc.create(ProductDraft::new(valid_fields("A")).with_id("  ")).unwrap();
        let b = svc.create(ProductDraft::new(valid_fields("B"))).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn create_rejects_malformed_identity() {
        let svc = service();
        let err = svc
            .create(ProductDraft::new(valid_fields("P")).with_id("not-a-uuid"))
            .unwrap_err();
        assert!(matches!(err, DomainError::MalformedId(_)));
        assert_eq!(svc.repository().saves(), 0);
    }

    #[test]
    fn create_rejects_duplicate_code_without_saving() {
        let svc = service();
        svc.repository().seed(stored("P-100", 1));

        let err = svc.create(ProductDraft::new(valid_fields("P-100"))).unwrap_err();
        assert_eq!(err, DomainError::DuplicateCode("P-100".to_string()));
        assert_eq!(svc.repository().saves(), 0);
    }

    #[test]
    fn create_propagates_validation_before_touching_storage() {
        let svc = ProductService::new(FailingRepository);
        let mut fields = valid_fields("P");
        fields.price = -1.0;
        let err = svc.create(ProductDraft::new(fields)).unwrap_err();
        assert_eq!(err, DomainError::Validation(ValidationError::NegativePrice(-1.0)));
    }

    #[test]
    fn storage_failures_surface_as_storage_errors() {
        let svc = ProductService::new(FailingRepository);
        let err = svc.create(ProductDraft::new(valid_fields("P"))).unwrap_err();
        assert_eq!(err, DomainError::Storage("connection reset".to_string()));
        assert!(matches!(svc.get_all(), Err(DomainError::Storage(_))));
    }

    #[test]
    fn update_restamps_updated_at_and_keeps_created_at() {
        let svc = service();
        let original = stored("P-200", T0 - 5_000);
        svc.repository().seed(original.clone());
        svc.clock.advance(1_000);

        let mut fields = valid_fields("P-200");
        fields.name = "Renamed".to_string();
        fields.created_at = 99; // ignored
        let draft = ProductDraft::new(fields).with_id(original.id().to_string());
        let updated = svc.update(draft).unwrap();

        assert_eq!(updated.name(), "Renamed");
        assert_eq!(updated.created_at(), original.created_at());
        assert_eq!(updated.updated_at(), T0 + 1_000);
        assert!(updated.updated_at() > original.updated_at());
        assert_eq!(svc.repository().saves(), 1);
    }

    #[test]
    fn update_moves_updated_at_forward_when_clock_has_not() {
        let svc = service();
        let mut fields = valid_fields("P-201");
        fields.created_at = T0;
        fields.updated_at = T0;
        let original = Product::new(ProductId::new(), fields.clone()).unwrap();
        svc.repository().seed(original.clone());

        let updated = svc
            .update(ProductDraft::new(fields).with_id(original.id().to_string()))
            .unwrap();
        assert_eq!(updated.updated_at(), T0 + 1);
        assert_eq!(updated.created_at(), T0);
    }

    #[test]
    fn update_allows_keeping_own_code() {
        let svc = service();
        let original = stored("SAME", 1);
        svc.repository().seed(original.clone());
        let draft = ProductDraft::new(valid_fields("SAME")).with_id(original.id().to_string());
        assert!(svc.update(draft).is_ok());
    }

    #[test]
    fn update_rejects_code_owned_by_another_product() {
        let svc = service();
        let first = stored("TEST-001", 1);
        let second = stored("TEST-002", 1);
        svc.repository().seed(first.clone());
        svc.repository().seed(second);

        let draft = ProductDraft::new(valid_fields("TEST-002")).with_id(first.id().to_string());
        let err = svc.update(draft).unwrap_err();
        assert_eq!(err, DomainError::DuplicateCode("TEST-002".to_string()));
        assert_eq!(svc.repository().saves(), 0);
        // Default port method does the full scan.
        assert_eq!(svc.repository().find_all_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn update_of_unknown_product_is_not_found() {
        let svc = service();
        let id = ProductId::new();
        let err = svc
            .update(ProductDraft::new(valid_fields("P")).with_id(id.to_string()))
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound(id));
        assert_eq!(svc.repository().saves(), 0);
    }

    #[test]
    fn update_requires_identity() {
        let svc = service();
        let err = svc.update(ProductDraft::new(valid_fields("P"))).unwrap_err();
        assert!(matches!(err, DomainError::MalformedId(_)));
    }

    #[test]
    fn update_validates_fields() {
        let svc = service();
        let original = stored("P", 1);
        svc.repository().seed(original.clone());
        let mut fields = valid_fields("P");
        fields.rating = 8;
        let err = svc
            .update(ProductDraft::new(fields).with_id(original.id().to_string()))
            .unwrap_err();
        assert_eq!(err, DomainError::Validation(ValidationError::RatingOutOfRange(8)));
    }

    #[test]
    fn delete_existing_product() {
        let svc = service();
        let p = stored("DEL", 1);
        svc.repository().seed(p.clone());

        svc.delete_by_id(&p.id().to_string()).unwrap();
        assert_eq!(svc.repository().deletes(), 1);
        assert_eq!(svc.get_by_id(&p.id().to_string()).unwrap(), None);
    }

    #[test]
    fn delete_unknown_product_is_not_found_and_never_deletes() {
        let svc = service();
        let id = ProductId::new();
        let err = svc.delete_by_id(&id.to_string()).unwrap_err();
        assert_eq!(err, DomainError::NotFound(id));
        assert_eq!(svc.repository().deletes(), 0);
    }

    #[test]
    fn delete_rejects_malformed_identity() {
        let svc = service();
        assert!(matches!(
            svc.delete_by_id("not-a-uuid"),
            Err(DomainError::MalformedId(_))
        ));
        assert_eq!(svc.repository().deletes(), 0);
    }

    #[test]
    fn get_by_id_returns_none_for_missing_record() {
        let svc = service();
        assert_eq!(svc.get_by_id(&ProductId::new().to_string()).unwrap(), None);
        assert!(matches!(svc.get_by_id("nope"), Err(DomainError::MalformedId(_))));
    }

    #[test]
    fn get_all_returns_every_record() {
        let svc = service();
        svc.repository().seed(stored("A", 1));
        svc.repository().seed(stored("B", 1));
        let mut codes: Vec<String> = svc
            .get_all()
            .unwrap()
            .into_iter()
            .map(|p| p.code().to_string())
            .collect();
        codes.sort();
        assert_eq!(codes, vec!["A", "B"]);
    }

    fn race_same_code(repo: RecordingRepository) -> Vec<DomainResult<Product>> {
        let barrier = Arc::new(Barrier::new(2));
        let svc = ProductService::with_clock(
            repo.with_exists_barrier(barrier),
            ManualClock::new(T0),
        );
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..2)
                .map(|_| s.spawn(|| svc.create(ProductDraft::new(valid_fields("RACE")))))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        })
    }

    #[test]
    fn concurrent_creates_both_pass_service_check_without_storage_guard() {
        let results = race_same_code(RecordingRepository::default());
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn concurrent_creates_are_deduplicated_by_storage_guard() {
        let results = race_same_code(RecordingRepository::enforcing());
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let dup = results
            .iter()
            .filter(|r| matches!(r, Err(DomainError::DuplicateCode(c)) if c == "RACE"))
            .count();
        assert_eq!((ok, dup), (1, 1));
    }
}
