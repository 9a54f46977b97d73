//! # Forms Module
//!
//! Declarative, rule-driven form validation:
//! - Field values and the `FormFields` access trait
//! - Per-field rule sets evaluated in a fixed priority order
//! - A stateful validator with debounced change and immediate blur handling

pub mod engine;
pub mod rules;
pub mod value;

#[cfg(test)]
mod tests;

pub use engine::{FieldStatus, FormValidator, ValidationSnapshot, DEFAULT_DEBOUNCE};
pub use rules::{Check, FieldRules, Message, Rule, RuleKind, RuleSet};
pub use value::{FieldValue, FormFields};
