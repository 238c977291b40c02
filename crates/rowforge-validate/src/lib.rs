//! Consistency validation for Rowforge datasets.
//!
//! Re-derives uniqueness and referential-integrity expectations from the
//! schema and checks them against freshly generated rows or CSV files on
//! disk, collecting violations instead of failing on the first problem.

pub mod engine;
pub mod errors;
pub mod model;

pub use engine::ValidationEngine;
pub use errors::ValidateError;
pub use model::{ValidationResult, Violation};
