//! Storage adapters implementing the products `ProductRepository` port.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryProductRepository;
pub use postgres::PostgresProductRepository;
