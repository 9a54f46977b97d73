// src/registration/submit.rs
//! Final registration submission

use async_trait::async_trait;
use reqwest::multipart::Form;
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

use super::models::*;
use super::validators::{parse_age, parse_category_id};
use crate::api::upload::{file_part, UploadKind};
use crate::api::validators::{validate_entity_id, ReasonValidator};
use crate::api::{ApiClient, ClaimRequest, EmployeeService, EstablishmentService, QueryCache};
use crate::common::{safe_email_log, ClientError, ClientResult, Validator};

/// Performs the network side of a completed registration
#[async_trait]
pub trait RegistrationSubmitter: Send + Sync {
    async fn submit(&self, form: &RegistrationForm) -> ClientResult<RegistrationReceipt>;
}

/// Path-specific work after the account exists, checked before registering
enum FollowUp {
    None,
    ClaimEmployee { id: String, message: String },
    ClaimEstablishment { id: String, message: String },
    CreateEmployee {
        request: CreateEmployeeRequest,
        photos: Option<Form>,
    },
    CreateEstablishment(CreateEstablishmentRequest),
}

/// Submits registrations to the directory API
///
/// The whole follow-up is validated and its files are read before the account
/// is created. The account is then registered and the follow-up runs with the
/// new account's token. If the follow-up fails, the created account is kept
/// and a retry for the same email resumes from the follow-up.
pub struct HttpRegistrationSubmitter {
    client: ApiClient,
    cache: QueryCache,
    /// Account created by an attempt whose follow-up failed, keyed by email
    registered: Mutex<Option<(String, RegisterAccountResponse)>>,
}

impl HttpRegistrationSubmitter {
    pub fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self {
            client,
            cache,
            registered: Mutex::new(None),
        }
    }

    /// Whether an earlier attempt already created an account for `email`
    pub fn has_registered_account(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.lock_registered()
            .as_ref()
            .is_some_and(|(registered, _)| *registered == email)
    }

    fn lock_registered(
        &self,
    ) -> std::sync::MutexGuard<'_, Option<(String, RegisterAccountResponse)>> {
        self.registered.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn prepare(&self, form: &RegistrationForm) -> ClientResult<FollowUp> {
        let follow_up = match (form.account_type, form.employee_path, form.owner_path) {
            (None, _, _) => {
                return Err(ClientError::Validation(
                    "Please select an account type".to_string(),
                ))
            }
            (Some(AccountType::Employee), Some(PathChoice::Claim), _) => FollowUp::ClaimEmployee {
                id: claim_target(&form.claimed_employee_id, "profile")?,
                message: claim_message(form)?,
            },
            (Some(AccountType::Employee), Some(PathChoice::Create), _) => {
                let age = match form.age.trim() {
                    "" => None,
                    raw => Some(parse_age(raw).ok_or_else(|| {
                        ClientError::Validation("Age must be a whole number".to_string())
                    })?),
                };
                FollowUp::CreateEmployee {
                    request: CreateEmployeeRequest {
                        name: form.employee_name.trim().to_string(),
                        nickname: non_empty(&form.nickname),
                        age,
                        nationality: non_empty(&form.nationality),
                        description: non_empty(&form.description),
                        photos: Vec::new(),
                        current_establishment_id: form.current_establishment_id.clone(),
                    },
                    photos: photo_form(form).await?,
                }
            }
            (Some(AccountType::EstablishmentOwner), _, Some(PathChoice::Claim)) => {
                FollowUp::ClaimEstablishment {
                    id: claim_target(&form.claimed_establishment_id, "establishment")?,
                    message: claim_message(form)?,
                }
            }
            (Some(AccountType::EstablishmentOwner), _, Some(PathChoice::Create)) => {
                let category_id = form
                    .establishment_category_id
                    .as_deref()
                    .and_then(parse_category_id)
                    .ok_or_else(|| {
                        ClientError::Validation("Please select a category".to_string())
                    })?;
                FollowUp::CreateEstablishment(CreateEstablishmentRequest {
                    name: form.establishment_name.trim().to_string(),
                    address: form.establishment_address.trim().to_string(),
                    category_id,
                    description: non_empty(&form.establishment_description),
                })
            }
            (Some(AccountType::Employee), None, _)
            | (Some(AccountType::EstablishmentOwner), _, None) => {
                warn!("Registration submitted without a chosen path");
                FollowUp::None
            }
            (Some(AccountType::Regular), _, _) => FollowUp::None,
        };
        Ok(follow_up)
    }

    /// Registers the account, or reuses the one a failed attempt created
    async fn account_for(&self, form: &RegistrationForm) -> ClientResult<RegisterAccountResponse> {
        let email = normalize_email(&form.email);
        if let Some((registered, account)) = self.lock_registered().as_ref() {
            if *registered == email {
                info!(user_id = %account.user.id, "Resuming registration for existing account");
                return Ok(account.clone());
            }
        }

        let account_type = form
            .account_type
            .ok_or_else(|| ClientError::Validation("Please select an account type".to_string()))?;
        let request = RegisterAccountRequest {
            pseudonym: form.pseudonym.trim().to_string(),
            email: email.clone(),
            password: form.password.clone(),
            phone: non_empty(&form.phone),
            account_type,
        };

        let account: RegisterAccountResponse =
            self.client.post_json("/api/auth/register", &request).await?;
        *self.lock_registered() = Some((email, account.clone()));
        Ok(account)
    }

    async fn run(&self, client: &ApiClient, follow_up: FollowUp) -> ClientResult<Option<String>> {
        match follow_up {
            FollowUp::None => Ok(None),
            FollowUp::ClaimEmployee { id, message } => {
                EmployeeService::new(client.clone(), self.cache.clone())
                    .claim(&id, &message)
                    .await?;
                Ok(Some(id))
            }
            FollowUp::ClaimEstablishment { id, message } => {
                EstablishmentService::new(client.clone(), self.cache.clone())
                    .claim(&id, &message)
                    .await?;
                Ok(Some(id))
            }
            FollowUp::CreateEmployee {
                mut request,
                photos,
            } => {
                if let Some(photos) = photos {
                    let uploaded: UploadImagesResponse =
                        client.post_multipart("/api/upload/images", photos).await?;
                    request.photos = uploaded.images.into_iter().map(|i| i.url).collect();
                }

                let created: CreatedEntity = client.post_json("/api/employees", &request).await?;
                self.cache.invalidate_prefix("employees").await;
                Ok(created.id)
            }
            FollowUp::CreateEstablishment(request) => {
                let created: CreatedEntity =
                    client.post_json("/api/establishments", &request).await?;
                self.cache.invalidate_prefix("establishments").await;
                Ok(created.id)
            }
        }
    }
}

#[async_trait]
impl RegistrationSubmitter for HttpRegistrationSubmitter {
    async fn submit(&self, form: &RegistrationForm) -> ClientResult<RegistrationReceipt> {
        info!(
            email = %safe_email_log(&form.email),
            account_type = ?form.account_type,
            "Submitting registration"
        );

        let follow_up = self.prepare(form).await?;
        let account = self.account_for(form).await?;

        // Follow-ups act as the newly created user
        let mut client = self.client.clone();
        if account.token.is_some() {
            client.set_token(account.token.clone());
        }

        let linked_entity_id = match self.run(&client, follow_up).await {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    user_id = %account.user.id,
                    error = %e,
                    "Registration follow-up failed, account kept for retry"
                );
                return Err(e);
            }
        };

        self.lock_registered().take();
        info!(user_id = %account.user.id, "Registration completed");
        Ok(RegistrationReceipt {
            user_id: account.user.id,
            token: account.token,
            linked_entity_id,
        })
    }
}

async fn photo_form(form: &RegistrationForm) -> ClientResult<Option<Form>> {
    if form.photos.is_empty() {
        return Ok(None);
    }

    let mut multipart = Form::new();
    for path in &form.photos {
        multipart = multipart.part("images", file_part(path, UploadKind::Photo).await?);
    }
    Ok(Some(multipart))
}

fn claim_message(form: &RegistrationForm) -> ClientResult<String> {
    let request = ClaimRequest {
        message: form.claim_message.trim().to_string(),
    };
    let result = ReasonValidator.validate(&request);
    if !result.is_valid {
        return Err(result.into());
    }
    Ok(request.message)
}

fn claim_target(id: &Option<String>, what: &str) -> ClientResult<String> {
    let id = id
        .clone()
        .ok_or_else(|| ClientError::Validation(format!("Please select the {} to claim", what)))?;
    validate_entity_id(&id).map_err(ClientError::Validation)?;
    Ok(id)
}

fn non_empty(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
