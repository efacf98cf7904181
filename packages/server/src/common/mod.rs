// Common types shared across the application

pub mod errors;

pub use errors::{ServiceError, ServiceResult};
