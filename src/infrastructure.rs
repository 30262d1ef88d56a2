// Infrastructure layer modules
pub mod config;
pub mod logging;
pub mod product_repository;

// Re-exports
pub use config::{DatabaseConfig, DatabaseConfigError};
pub use logging::init_logging;
pub use product_repository::{PgProductRepository, ProductRepository, ProductRepositoryError};
