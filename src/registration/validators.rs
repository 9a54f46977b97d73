// src/registration/validators.rs

use regex::Regex;
use std::sync::LazyLock;

use super::models::fields::*;
use super::models::*;
use super::steps::StepKind;
use crate::common::{ValidationResult, Validator};
use crate::forms::rules::{matches_field, password_strength};
use crate::forms::{Check, FieldRules, FieldValue, RuleSet};

static PSEUDONYM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("valid regex"));

pub const MIN_CLAIM_MESSAGE: usize = 10;
pub const MAX_PHOTOS: usize = 5;
pub const MIN_AGE: f64 = 18.0;
pub const MAX_AGE: f64 = 100.0;

type Rules = FieldRules<RegistrationForm>;

// ============================================================================
// Rule sets per step
// ============================================================================

/// Rules a step must satisfy before the wizard may leave it
///
/// The set depends on the selected account type and path, so claim-only
/// fields are only required on claim branches.
pub fn step_rules(kind: StepKind, form: &RegistrationForm) -> RuleSet<RegistrationForm> {
    match kind {
        StepKind::AccountType => RuleSet::new().field(
            ACCOUNT_TYPE,
            Rules::new().required().message("Please select an account type"),
        ),
        StepKind::EmployeePath => {
            let rules = RuleSet::new().field(
                EMPLOYEE_PATH,
                Rules::new()
                    .required()
                    .message("Please choose whether to claim or create a profile"),
            );
            if form.employee_path == Some(PathChoice::Claim) {
                rules.field(
                    CLAIMED_EMPLOYEE_ID,
                    Rules::new()
                        .required()
                        .message("Please select the profile you want to claim"),
                )
            } else {
                rules
            }
        }
        StepKind::OwnerCredentials => credential_rules(),
        StepKind::RegistrationForm => {
            let mut rules = credential_rules();
            if form.account_type == Some(AccountType::Employee)
                && form.employee_path == Some(PathChoice::Claim)
            {
                rules = rules.field(CLAIM_MESSAGE, claim_message_rules());
            }
            rules
        }
        StepKind::OwnerPath => {
            let rules = RuleSet::new().field(
                OWNER_PATH,
                Rules::new()
                    .required()
                    .message("Please choose whether to claim or create an establishment"),
            );
            if form.owner_path == Some(PathChoice::Claim) {
                rules
                    .field(
                        CLAIMED_ESTABLISHMENT_ID,
                        Rules::new()
                            .required()
                            .message("Please select the establishment you own"),
                    )
                    .field(CLAIM_MESSAGE, claim_message_rules())
            } else {
                rules
            }
        }
        StepKind::EmployeeProfile => RuleSet::new()
            .field(
                EMPLOYEE_NAME,
                Rules::new().label("Name").required().min_length(2).max_length(100),
            )
            .field(NICKNAME, Rules::new().label("Nickname").max_length(50))
            .field(
                AGE,
                Rules::new()
                    .label("Age")
                    .required()
                    .min(MIN_AGE)
                    .max(MAX_AGE)
                    .custom(|value: &FieldValue, _: &RegistrationForm| {
                        match value.as_text() {
                            Some(s) if parse_age(s).is_none() => {
                                Check::FailWith("Age must be a whole number".to_string())
                            }
                            _ => Check::Pass,
                        }
                    }),
            )
            .field(NATIONALITY, Rules::new().label("Nationality").max_length(50))
            .field(DESCRIPTION, Rules::new().label("Description").max_length(1000))
            .field(
                PHOTOS,
                Rules::new()
                    .required()
                    .message_fn(|_, kind, _| match kind {
                        crate::forms::RuleKind::Required => {
                            "At least one photo is required".to_string()
                        }
                        _ => format!("You can upload at most {} photos", MAX_PHOTOS),
                    })
                    .custom(|value: &FieldValue, _: &RegistrationForm| {
                        value.as_list().map_or(true, |items| items.len() <= MAX_PHOTOS)
                    }),
            ),
        StepKind::OwnerEstablishment => RuleSet::new()
            .field(
                ESTABLISHMENT_NAME,
                Rules::new()
                    .label("Establishment name")
                    .required()
                    .min_length(2)
                    .max_length(100),
            )
            .field(
                ESTABLISHMENT_ADDRESS,
                Rules::new().label("Address").required().max_length(255),
            )
            .field(
                ESTABLISHMENT_CATEGORY_ID,
                Rules::new()
                    .required()
                    .custom(|value: &FieldValue, _: &RegistrationForm| {
                        value.as_text().map_or(true, |s| parse_category_id(s).is_some())
                    })
                    .message("Please select a category"),
            )
            .field(
                ESTABLISHMENT_DESCRIPTION,
                Rules::new().label("Description").max_length(1000),
            ),
    }
}

fn credential_rules() -> RuleSet<RegistrationForm> {
    RuleSet::new()
        .field(
            PSEUDONYM,
            Rules::new()
                .label("Pseudonym")
                .required()
                .min_length(3)
                .max_length(30)
                .pattern(PSEUDONYM_RE.clone()),
        )
        .field(EMAIL, Rules::new().label("Email").required().email())
        .field(
            PASSWORD,
            Rules::new()
                .label("Password")
                .required()
                .min_length(8)
                .custom(password_strength::<RegistrationForm>),
        )
        .field(
            PASSWORD_CONFIRMATION,
            Rules::new()
                .required()
                .message_fn(|_, kind, _| match kind {
                    crate::forms::RuleKind::Required => {
                        "Please confirm your password".to_string()
                    }
                    _ => "Passwords do not match".to_string(),
                })
                .custom(matches_field(PASSWORD, "Passwords do not match")),
        )
        .field(PHONE, Rules::new().label("Phone").phone())
        .field(
            ACCEPT_TERMS,
            Rules::new().custom(|value: &FieldValue, _: &RegistrationForm| {
                if value.as_bool() == Some(true) {
                    Check::Pass
                } else {
                    Check::FailWith("You must accept the terms of use".to_string())
                }
            }),
        )
}

/// Age as submitted; the step rules accept exactly what this parses
pub fn parse_age(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

/// Category id as submitted; the step rules accept exactly what this parses
pub fn parse_category_id(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

fn claim_message_rules() -> Rules {
    Rules::new()
        .label("Claim message")
        .required()
        .min_length(MIN_CLAIM_MESSAGE)
        .max_length(1000)
}

// ============================================================================
// Step Validator
// ============================================================================

/// Whole-step check used as the wizard's advancement predicate
pub struct StepValidator(pub StepKind);

impl Validator<RegistrationForm> for StepValidator {
    fn validate(&self, data: &RegistrationForm) -> ValidationResult {
        step_rules(self.0, data).check(data)
    }
}
