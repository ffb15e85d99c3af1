//! Products domain module.
//!
//! This crate contains the product aggregate, the storage port it is persisted
//! through, and the lifecycle service that enforces the rules a single product
//! cannot check on its own (code uniqueness, existence, timestamps).

pub mod product;
pub mod repository;
pub mod service;

pub use product::{InventoryStatus, Product, ProductFields};
pub use repository::{ProductRepository, RepositoryError};
pub use service::{ProductDraft, ProductService};
