//! Postgres-backed product store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError | Scenario |
//! |------------|----------------------|-----------------|----------|
//! | Database (unique violation) | `23505` | `DuplicateCode` | Another row already owns the code (`products_code_key`) |
//! | Database (check constraint violation) | `23514` | `Backend` | Row broke a column check (should be caught by the entity first) |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | PoolClosed | N/A | `Backend` | Connection pool was closed |
//! | Other | N/A | `Backend` | Network errors, connection failures, etc. |
//!
//! ## Thread Safety
//!
//! `PostgresProductRepository` is `Send + Sync` and can be shared across threads.
//! The `ProductRepository` port is synchronous; each call blocks the current
//! worker thread via `block_in_place`, so it must run on a multi-threaded tokio
//! runtime.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{Span, instrument};
use uuid::Uuid;

use catalog_core::{Entity, ProductId};
use catalog_products::{InventoryStatus, Product, ProductFields, ProductRepository, RepositoryError};

/// Schema applied by [`PostgresProductRepository::migrate`].
pub const SCHEMA: &str = include_str!("../../migrations/0001_products.sql");

const SELECT_COLUMNS: &str = r#"
    id, code, name, description, image, category, price, quantity,
    internal_reference, shell_id, inventory_status, rating, created_at, updated_at
"#;

#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: Arc<PgPool>,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `products` table and its unique code index if missing.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    /// Insert or overwrite by id. An overwrite replaces every column, `created_at` included.
    #[instrument(skip(self, product), fields(product_id = %product.id(), code = %product.code()), err)]
    pub async fn upsert(&self, product: &Product) -> Result<Product, RepositoryError> {
        let sql = format!(
            r#"
            INSERT INTO products (
                id, code, name, description, image, category, price, quantity,
                internal_reference, shell_id, inventory_status, rating, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (id) DO UPDATE SET
                code = EXCLUDED.code,
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                image = EXCLUDED.image,
                category = EXCLUDED.category,
                price = EXCLUDED.price,
                quantity = EXCLUDED.quantity,
                internal_reference = EXCLUDED.internal_reference,
                shell_id = EXCLUDED.shell_id,
                inventory_status = EXCLUDED.inventory_status,
                rating = EXCLUDED.rating,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at
            RETURNING {SELECT_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(product.id().as_uuid())
            .bind(product.code())
            .bind(product.name())
            .bind(product.description())
            .bind(product.image())
            .bind(product.category())
            .bind(product.price())
            .bind(product.quantity())
            .bind(product.internal_reference())
            .bind(product.shell_id())
            .bind(product.inventory_status().as_str())
            .bind(product.rating())
            .bind(millis_to_timestamp(product.created_at())?)
            .bind(millis_to_timestamp(product.updated_at())?)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    RepositoryError::DuplicateCode(product.code().to_string())
                } else {
                    map_sqlx_error("upsert", e)
                }
            })?;

        row_to_product(&row)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn fetch_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_by_id", e))?;

        row.as_ref().map(row_to_product).transpose()
    }

    #[instrument(skip(self), fields(row_count = tracing::field::Empty), err)]
    pub async fn fetch_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let span = Span::current();
        let sql = format!("SELECT {SELECT_COLUMNS} FROM products");
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_all", e))?;

        span.record("row_count", rows.len());
        rows.iter().map(row_to_product).collect()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn code_taken(
        &self,
        code: &str,
        excluding: Option<&ProductId>,
    ) -> Result<bool, RepositoryError> {
        let excluded: Option<Uuid> = excluding.map(|id| *id.as_uuid());
        let row = sqlx::query(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM products
                WHERE code = $1 AND ($2::uuid IS NULL OR id <> $2)
            ) AS taken
            "#,
        )
        .bind(code)
        .bind(excluded)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("code_taken", e))?;

        row.try_get::<bool, _>("taken")
            .map_err(|e| map_sqlx_error("code_taken", e))
    }

    fn run<F, T>(&self, fut: F) -> Result<T, RepositoryError>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        let handle = Handle::try_current().map_err(|_| {
            RepositoryError::backend(
                "PostgresProductRepository requires a tokio runtime; call it from within one",
            )
        })?;
        if handle.runtime_flavor() == RuntimeFlavor::CurrentThread {
            return Err(RepositoryError::backend(
                "PostgresProductRepository requires a multi-threaded tokio runtime",
            ));
        }
        tokio::task::block_in_place(|| handle.block_on(fut))
    }
}

impl ProductRepository for PostgresProductRepository {
    fn save(&self, product: Product) -> Result<Product, RepositoryError> {
        self.run(self.upsert(&product))
    }

    fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        self.run(self.fetch_by_id(id))
    }

    fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        self.run(self.fetch_all())
    }

    fn delete_by_id(&self, id: &ProductId) -> Result<(), RepositoryError> {
        self.run(self.delete(id))
    }

    fn exists_by_code(&self, code: &str) -> Result<bool, RepositoryError> {
        self.run(self.code_taken(code, None))
    }

    fn exists_by_code_excluding(
        &self,
        code: &str,
        id: &ProductId,
    ) -> Result<bool, RepositoryError> {
        self.run(self.code_taken(code, Some(id)))
    }
}

fn row_to_product(row: &PgRow) -> Result<Product, RepositoryError> {
    let get_err = |e: sqlx::Error| map_sqlx_error("decode_row", e);

    let id: Uuid = row.try_get("id").map_err(get_err)?;
    let status: String = row.try_get("inventory_status").map_err(get_err)?;
    let inventory_status: InventoryStatus = status
        .parse()
        .map_err(|e| RepositoryError::backend(format!("row {id}: {e}")))?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(get_err)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(get_err)?;

    let fields = ProductFields {
        code: row.try_get("code").map_err(get_err)?,
        name: row.try_get("name").map_err(get_err)?,
        description: row.try_get("description").map_err(get_err)?,
        image: row.try_get("image").map_err(get_err)?,
        category: row.try_get("category").map_err(get_err)?,
        price: row.try_get("price").map_err(get_err)?,
        quantity: row.try_get("quantity").map_err(get_err)?,
        internal_reference: row.try_get("internal_reference").map_err(get_err)?,
        shell_id: row.try_get("shell_id").map_err(get_err)?,
        inventory_status,
        rating: row.try_get("rating").map_err(get_err)?,
        created_at: created_at.timestamp_millis(),
        updated_at: updated_at.timestamp_millis(),
    };

    Product::new(ProductId::from_uuid(id), fields)
        .map_err(|e| RepositoryError::backend(format!("row {id} violates product invariants: {e}")))
}

fn millis_to_timestamp(millis: i64) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| RepositoryError::backend(format!("timestamp {millis} is out of range")))
}

/// Map a SQLx error to a `RepositoryError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            RepositoryError::backend(format!(
                "database error in {}: {}",
                operation,
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::backend(format!("connection pool closed in {}", operation))
        }
        _ => RepositoryError::backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

/// Check if an error is a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}
