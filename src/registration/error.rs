// src/registration/error.rs

use super::models::AccountType;
use crate::common::{ClientError, ValidationResult};

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Step {step} does not exist for account type {account_type:?}")]
    InvalidStep {
        step: u8,
        account_type: Option<AccountType>,
    },

    #[error("Step {step} is incomplete")]
    StepIncomplete { step: u8, result: ValidationResult },

    #[error("Step {0} is the final step; submit instead")]
    AtFinalStep(u8),

    #[error("Step {0} is not the final step")]
    NotFinalStep(u8),

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Submission failed: {0}")]
    Submission(#[from] ClientError),
}

impl WizardError {
    /// Inline message for the current step
    pub fn user_message(&self) -> String {
        match self {
            WizardError::StepIncomplete { result, .. } => result
                .errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "Please complete this step".to_string()),
            WizardError::Submission(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
