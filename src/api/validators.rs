// src/api/validators.rs

use super::models::*;
use crate::common::{ValidationResult, Validator};

pub const MIN_REASON_LENGTH: usize = 10;
pub const MAX_REASON_LENGTH: usize = 1000;

// ============================================================================
// Claim / Removal Validators
// ============================================================================

pub struct ReasonValidator;

impl Validator<RemovalRequest> for ReasonValidator {
    fn validate(&self, data: &RemovalRequest) -> ValidationResult {
        validate_text("reason", "Reason", &data.reason)
    }
}

impl Validator<ClaimRequest> for ReasonValidator {
    fn validate(&self, data: &ClaimRequest) -> ValidationResult {
        validate_text("message", "Claim message", &data.message)
    }
}

impl Validator<DeletionRequest> for ReasonValidator {
    fn validate(&self, data: &DeletionRequest) -> ValidationResult {
        let mut result = validate_text("reason", "Reason", &data.reason);

        if let Some(email) = &data.contact_email {
            if !email.trim().is_empty() && !email.contains('@') {
                result.add_error("contact_email", "Contact email must be valid");
            }
        }

        if data.document.as_os_str().is_empty() {
            result.add_error("document", "A supporting document is required");
        }

        result
    }
}

fn validate_text(field: &str, label: &str, value: &str) -> ValidationResult {
    let mut result = ValidationResult::new();
    let length = value.trim().chars().count();

    if length == 0 {
        result.add_error(field, &format!("{} is required", label));
    } else if length < MIN_REASON_LENGTH {
        result.add_error(
            field,
            &format!("{} must be at least {} characters", label, MIN_REASON_LENGTH),
        );
    } else if length > MAX_REASON_LENGTH {
        result.add_error(
            field,
            &format!("{} must be at most {} characters", label, MAX_REASON_LENGTH),
        );
    }

    result
}

/// Validates an entity id picked from a list before it goes into a URL
pub fn validate_entity_id(id: &str) -> Result<(), String> {
    if id.trim().is_empty() {
        return Err("An id is required".to_string());
    }
    if id.len() > 64 {
        return Err("Id is too long".to_string());
    }
    Ok(())
}
