// Domain layer modules
pub mod api_response;
pub mod product;
pub mod validation;

// Re-exports
pub use api_response::ApiResponse;
pub use product::{NewProduct, Product, ProductChanges, ProductId};
pub use validation::FieldErrors;
