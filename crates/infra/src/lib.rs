//! Infrastructure layer: storage adapters and configuration.

pub mod config;
pub mod product_store;

pub use config::{AppConfig, ConfigError, LogFormat};
pub use product_store::{InMemoryProductRepository, PostgresProductRepository};
