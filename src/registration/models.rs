use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::forms::{FieldValue, FormFields};

// ============================================================================
// Field keys
// ============================================================================

pub mod fields {
    pub const ACCOUNT_TYPE: &str = "account_type";
    pub const EMPLOYEE_PATH: &str = "employee_path";
    pub const OWNER_PATH: &str = "owner_path";

    pub const PSEUDONYM: &str = "pseudonym";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const PASSWORD_CONFIRMATION: &str = "password_confirmation";
    pub const PHONE: &str = "phone";
    pub const ACCEPT_TERMS: &str = "accept_terms";

    pub const CLAIMED_EMPLOYEE_ID: &str = "claimed_employee_id";
    pub const CLAIMED_ESTABLISHMENT_ID: &str = "claimed_establishment_id";
    pub const CLAIM_MESSAGE: &str = "claim_message";

    pub const EMPLOYEE_NAME: &str = "employee_name";
    pub const NICKNAME: &str = "nickname";
    pub const AGE: &str = "age";
    pub const NATIONALITY: &str = "nationality";
    pub const DESCRIPTION: &str = "description";
    pub const PHOTOS: &str = "photos";
    pub const CURRENT_ESTABLISHMENT_ID: &str = "current_establishment_id";

    pub const ESTABLISHMENT_NAME: &str = "establishment_name";
    pub const ESTABLISHMENT_ADDRESS: &str = "establishment_address";
    pub const ESTABLISHMENT_CATEGORY_ID: &str = "establishment_category_id";
    pub const ESTABLISHMENT_DESCRIPTION: &str = "establishment_description";
}

// ============================================================================
// Discriminators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Regular,
    Employee,
    EstablishmentOwner,
}

impl AccountType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "regular" => Some(Self::Regular),
            "employee" => Some(Self::Employee),
            "establishment_owner" => Some(Self::EstablishmentOwner),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Employee => "employee",
            Self::EstablishmentOwner => "establishment_owner",
        }
    }
}

/// Claim an existing profile/establishment or create a new one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathChoice {
    Claim,
    Create,
}

pub type EmployeePath = PathChoice;
pub type OwnerPath = PathChoice;

impl PathChoice {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "claim" => Some(Self::Claim),
            "create" => Some(Self::Create),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claim => "claim",
            Self::Create => "create",
        }
    }
}

// ============================================================================
// Form state
// ============================================================================

/// Everything the registration wizard collects, across all steps and paths
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub account_type: Option<AccountType>,
    pub employee_path: Option<EmployeePath>,
    pub owner_path: Option<OwnerPath>,

    // Credentials
    pub pseudonym: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub phone: String,
    pub accept_terms: bool,

    // Claims
    pub claimed_employee_id: Option<String>,
    pub claimed_establishment_id: Option<String>,
    pub claim_message: String,

    // Employee profile
    pub employee_name: String,
    pub nickname: String,
    pub age: String,
    pub nationality: String,
    pub description: String,
    pub photos: Vec<PathBuf>,
    pub current_establishment_id: Option<String>,

    // Establishment creation
    pub establishment_name: String,
    pub establishment_address: String,
    pub establishment_category_id: Option<String>,
    pub establishment_description: String,
}

impl RegistrationForm {
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }

    /// Applies a single field edit
    ///
    /// Changing a discriminator clears the selections that belong to the
    /// branches it no longer allows.
    pub fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), String> {
        use fields::*;

        match field {
            ACCOUNT_TYPE => {
                let next = parse_choice(&value, AccountType::parse)?;
                if next != self.account_type {
                    self.account_type = next;
                    self.employee_path = None;
                    self.owner_path = None;
                    self.claimed_employee_id = None;
                    self.claimed_establishment_id = None;
                    self.claim_message.clear();
                }
            }
            EMPLOYEE_PATH => {
                self.employee_path = parse_choice(&value, PathChoice::parse)?;
                if self.employee_path != Some(PathChoice::Claim) {
                    self.claimed_employee_id = None;
                    self.claim_message.clear();
                }
            }
            OWNER_PATH => {
                self.owner_path = parse_choice(&value, PathChoice::parse)?;
                if self.owner_path != Some(PathChoice::Claim) {
                    self.claimed_establishment_id = None;
                    self.claim_message.clear();
                }
            }
            PSEUDONYM => self.pseudonym = text(value),
            EMAIL => self.email = text(value),
            PASSWORD => self.password = text(value),
            PASSWORD_CONFIRMATION => self.password_confirmation = text(value),
            PHONE => self.phone = text(value),
            ACCEPT_TERMS => self.accept_terms = value.as_bool().unwrap_or(false),
            CLAIMED_EMPLOYEE_ID => self.claimed_employee_id = optional_text(value),
            CLAIMED_ESTABLISHMENT_ID => self.claimed_establishment_id = optional_text(value),
            CLAIM_MESSAGE => self.claim_message = text(value),
            EMPLOYEE_NAME => self.employee_name = text(value),
            NICKNAME => self.nickname = text(value),
            AGE => self.age = text(value),
            NATIONALITY => self.nationality = text(value),
            DESCRIPTION => self.description = text(value),
            PHOTOS => {
                self.photos = value
                    .as_list()
                    .map(|items| items.iter().map(PathBuf::from).collect())
                    .unwrap_or_default()
            }
            CURRENT_ESTABLISHMENT_ID => self.current_establishment_id = optional_text(value),
            ESTABLISHMENT_NAME => self.establishment_name = text(value),
            ESTABLISHMENT_ADDRESS => self.establishment_address = text(value),
            ESTABLISHMENT_CATEGORY_ID => self.establishment_category_id = optional_text(value),
            ESTABLISHMENT_DESCRIPTION => self.establishment_description = text(value),
            other => return Err(format!("Unknown field '{}'", other)),
        }

        Ok(())
    }
}

impl FormFields for RegistrationForm {
    fn field_value(&self, field: &str) -> FieldValue {
        use fields::*;

        match field {
            ACCOUNT_TYPE => self.account_type.map(|a| a.as_str()).into(),
            EMPLOYEE_PATH => self.employee_path.map(|p| p.as_str()).into(),
            OWNER_PATH => self.owner_path.map(|p| p.as_str()).into(),
            PSEUDONYM => (&self.pseudonym).into(),
            EMAIL => (&self.email).into(),
            PASSWORD => (&self.password).into(),
            PASSWORD_CONFIRMATION => (&self.password_confirmation).into(),
            PHONE => (&self.phone).into(),
            ACCEPT_TERMS => self.accept_terms.into(),
            CLAIMED_EMPLOYEE_ID => self.claimed_employee_id.clone().into(),
            CLAIMED_ESTABLISHMENT_ID => self.claimed_establishment_id.clone().into(),
            CLAIM_MESSAGE => (&self.claim_message).into(),
            EMPLOYEE_NAME => (&self.employee_name).into(),
            NICKNAME => (&self.nickname).into(),
            AGE => (&self.age).into(),
            NATIONALITY => (&self.nationality).into(),
            DESCRIPTION => (&self.description).into(),
            PHOTOS => FieldValue::List(
                self.photos
                    .iter()
                    .map(|p| p.to_string_lossy().into_owned())
                    .collect(),
            ),
            CURRENT_ESTABLISHMENT_ID => self.current_establishment_id.clone().into(),
            ESTABLISHMENT_NAME => (&self.establishment_name).into(),
            ESTABLISHMENT_ADDRESS => (&self.establishment_address).into(),
            ESTABLISHMENT_CATEGORY_ID => self.establishment_category_id.clone().into(),
            ESTABLISHMENT_DESCRIPTION => (&self.establishment_description).into(),
            _ => FieldValue::Empty,
        }
    }
}

fn text(value: FieldValue) -> String {
    match value {
        FieldValue::Text(s) => s,
        FieldValue::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn optional_text(value: FieldValue) -> Option<String> {
    Some(text(value)).filter(|s| !s.trim().is_empty())
}

fn parse_choice<T>(value: &FieldValue, parse: fn(&str) -> Option<T>) -> Result<Option<T>, String> {
    match value {
        FieldValue::Empty => Ok(None),
        FieldValue::Text(s) if s.trim().is_empty() => Ok(None),
        FieldValue::Text(s) => parse(s.trim())
            .map(Some)
            .ok_or_else(|| format!("Invalid choice '{}'", s)),
        _ => Err("Expected a text choice".to_string()),
    }
}

// ============================================================================
// Submission payloads
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RegisterAccountRequest {
    pub pseudonym: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub account_type: AccountType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterAccountResponse {
    pub user: RegisteredUser,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    pub id: String,
    #[serde(default)]
    pub pseudonym: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadImagesResponse {
    #[serde(default)]
    pub images: Vec<UploadedImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub photos: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_establishment_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateEstablishmentRequest {
    pub name: String,
    pub address: String,
    pub category_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedEntity {
    #[serde(default)]
    pub id: Option<String>,
}

/// What a successful submission produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReceipt {
    pub user_id: String,
    pub token: Option<String>,
    /// Claim or created profile/establishment id, when the path had one
    pub linked_entity_id: Option<String>,
}
