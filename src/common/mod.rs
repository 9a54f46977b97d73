// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod helpers;
pub mod validation;

// Re-export commonly used types for convenience
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use helpers::safe_email_log;
pub use validation::{ValidationError, ValidationResult, Validator};
