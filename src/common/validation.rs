// Common validation types and traits

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// First message reported for a field, if any
    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Collapse into the field -> message map the UI renders
    pub fn into_error_map(self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for error in self.errors {
            map.entry(error.field).or_insert(error.message);
        }
        map
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}
