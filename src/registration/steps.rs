//! Registration wizard step graph.
//!
//! Step numbers are 1-based. What a step shows is a pure function of the step
//! number, the account type and the selected employee/owner path:
//!
//! | account type        | path   | 1           | 2                | 3                | 4                  |
//! |---------------------|--------|-------------|------------------|------------------|--------------------|
//! | regular             | -      | AccountType | (skipped)        | RegistrationForm | -                  |
//! | employee            | claim  | AccountType | EmployeePath     | RegistrationForm | -                  |
//! | employee            | create | AccountType | EmployeePath     | RegistrationForm | EmployeeProfile    |
//! | establishment_owner | claim  | AccountType | OwnerCredentials | OwnerPath        | -                  |
//! | establishment_owner | create | AccountType | OwnerCredentials | OwnerPath        | OwnerEstablishment |

use serde::{Deserialize, Serialize};

use super::error::WizardError;
use super::models::{AccountType, PathChoice, RegistrationForm};
use super::validators::{step_rules, StepValidator};
use crate::common::{ValidationResult, Validator};
use crate::forms::RuleSet;

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum step number (1-based).
pub const MAX_STEP: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    AccountType,
    EmployeePath,
    OwnerCredentials,
    RegistrationForm,
    OwnerPath,
    EmployeeProfile,
    OwnerEstablishment,
}

impl StepKind {
    /// Resolve what step `step` shows for the current selections
    pub fn resolve(step: u8, form: &RegistrationForm) -> Result<Self, WizardError> {
        let invalid = || WizardError::InvalidStep {
            step,
            account_type: form.account_type,
        };

        if !(MIN_STEP..=MAX_STEP).contains(&step) {
            return Err(invalid());
        }

        match (step, form.account_type) {
            (1, _) => Ok(Self::AccountType),
            (2, Some(AccountType::Employee)) => Ok(Self::EmployeePath),
            (2, Some(AccountType::EstablishmentOwner)) => Ok(Self::OwnerCredentials),
            (3, Some(AccountType::Regular)) => Ok(Self::RegistrationForm),
            (3, Some(AccountType::Employee)) if form.employee_path.is_some() => {
                Ok(Self::RegistrationForm)
            }
            (3, Some(AccountType::EstablishmentOwner)) => Ok(Self::OwnerPath),
            (4, Some(AccountType::Employee)) if form.employee_path == Some(PathChoice::Create) => {
                Ok(Self::EmployeeProfile)
            }
            (4, Some(AccountType::EstablishmentOwner))
                if form.owner_path == Some(PathChoice::Create) =>
            {
                Ok(Self::OwnerEstablishment)
            }
            _ => Err(invalid()),
        }
    }

    /// Human-readable label for the step.
    pub fn label(self) -> &'static str {
        match self {
            Self::AccountType => "Account Type",
            Self::EmployeePath => "Claim or Create Profile",
            Self::OwnerCredentials => "Owner Account",
            Self::RegistrationForm => "Your Account",
            Self::OwnerPath => "Claim or Create Establishment",
            Self::EmployeeProfile => "Employee Profile",
            Self::OwnerEstablishment => "New Establishment",
        }
    }

    pub fn rules(self, form: &RegistrationForm) -> RuleSet<RegistrationForm> {
        step_rules(self, form)
    }

    pub fn check(self, form: &RegistrationForm) -> ValidationResult {
        StepValidator(self).validate(form)
    }

    /// Whether the wizard may leave (or submit from) this step
    pub fn can_advance(self, form: &RegistrationForm) -> bool {
        self.check(form).is_valid
    }
}

/// Step numbers reachable with the current selections, in order
///
/// Branches whose path is not chosen yet end at the step where the choice
/// is made.
pub fn step_sequence(form: &RegistrationForm) -> Vec<u8> {
    match form.account_type {
        None => vec![1],
        Some(AccountType::Regular) => vec![1, 3],
        Some(AccountType::Employee) => match form.employee_path {
            None => vec![1, 2],
            Some(PathChoice::Claim) => vec![1, 2, 3],
            Some(PathChoice::Create) => vec![1, 2, 3, 4],
        },
        Some(AccountType::EstablishmentOwner) => match form.owner_path {
            None | Some(PathChoice::Claim) => vec![1, 2, 3],
            Some(PathChoice::Create) => vec![1, 2, 3, 4],
        },
    }
}

/// The step that submits, once the branch is fully decided
pub fn final_step(form: &RegistrationForm) -> Option<u8> {
    match form.account_type? {
        AccountType::Regular => Some(3),
        AccountType::Employee => match form.employee_path? {
            PathChoice::Claim => Some(3),
            PathChoice::Create => Some(4),
        },
        AccountType::EstablishmentOwner => match form.owner_path? {
            PathChoice::Claim => Some(3),
            PathChoice::Create => Some(4),
        },
    }
}

pub fn next_step(current: u8, form: &RegistrationForm) -> Option<u8> {
    step_sequence(form).into_iter().find(|&s| s > current)
}

pub fn previous_step(current: u8, form: &RegistrationForm) -> Option<u8> {
    step_sequence(form).into_iter().rev().find(|&s| s < current)
}

/// Resumption step guessed from which fields are filled in
pub fn infer_step(form: &RegistrationForm) -> u8 {
    let inferred = if !form.pseudonym.trim().is_empty() || !form.email.trim().is_empty() {
        3
    } else if form.employee_path.is_some() || form.owner_path.is_some() {
        2
    } else {
        MIN_STEP
    };

    // Fall back along the branch until the step exists for these selections
    (MIN_STEP..=inferred)
        .rev()
        .find(|&s| StepKind::resolve(s, form).is_ok())
        .unwrap_or(MIN_STEP)
}
