//! # API Module
//!
//! Thin, cached access to the directory REST API:
//! - `ApiClient` wraps reqwest with base URL, bearer auth and error mapping
//! - `QueryCache` keys responses by normalized query parameters
//! - Employee and establishment services built on both

pub mod cache;
pub mod client;
pub mod employees;
pub mod establishments;
pub mod models;
pub mod upload;
pub mod validators;

#[cfg(test)]
mod tests;

pub use cache::{QueryCache, QueryKey};
pub use client::ApiClient;
pub use employees::EmployeeService;
pub use establishments::EstablishmentService;
pub use models::*;
