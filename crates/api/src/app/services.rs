use std::sync::Arc;

use anyhow::Context;

use catalog_core::{Clock, SystemClock};
use catalog_infra::{AppConfig, InMemoryProductRepository, PostgresProductRepository};
use catalog_products::{ProductRepository, ProductService};

/// Product service as wired by the server: storage and clock are chosen at startup.
pub type DynProductService = ProductService<Arc<dyn ProductRepository>, Arc<dyn Clock>>;

/// Which product store backs the running service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    InMemory,
    Postgres,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::InMemory => "in_memory",
            StoreKind::Postgres => "postgres",
        }
    }
}

#[derive(Clone)]
pub struct AppServices {
    pub products: DynProductService,
    pub store: StoreKind,
}

impl AppServices {
    pub fn new(repository: Arc<dyn ProductRepository>, clock: Arc<dyn Clock>, store: StoreKind) -> Self {
        Self {
            products: ProductService::with_clock(repository, clock),
            store,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryProductRepository::new()),
            Arc::new(SystemClock),
            StoreKind::InMemory,
        )
    }
}

/// Wire services from configuration.
///
/// Postgres is used when `DATABASE_URL` is set; the schema is applied before
/// the first request. Otherwise products live in process memory.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    match &config.database_url {
        Some(url) => {
            let repo = PostgresProductRepository::connect(url, config.max_connections)
                .await
                .context("failed to connect to postgres")?;
            repo.migrate()
                .await
                .context("failed to apply product schema")?;
            tracing::info!(max_connections = config.max_connections, "using postgres product store");
            Ok(AppServices::new(
                Arc::new(repo),
                Arc::new(SystemClock),
                StoreKind::Postgres,
            ))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; products are kept in memory and lost on restart");
            Ok(AppServices::in_memory())
        }
    }
}
