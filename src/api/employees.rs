// src/api/employees.rs
use reqwest::multipart::Form;
use tracing::info;

use super::cache::{normalize_params, QueryCache, QueryKey};
use super::client::ApiClient;
use super::models::*;
use super::upload::{file_part, UploadKind};
use super::validators::{validate_entity_id, ReasonValidator};
use crate::common::helpers::encode_segment;
use crate::common::{ClientError, ClientResult, Validator};

const SCOPE: &str = "employees";

/// Minimum query length before name suggestions are requested
pub const MIN_SUGGESTION_QUERY: usize = 2;

#[derive(Debug, Clone)]
pub struct EmployeeService {
    client: ApiClient,
    cache: QueryCache,
}

impl EmployeeService {
    pub fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// GET /api/employees
    pub async fn list(&self, params: &EmployeeListParams) -> ClientResult<EmployeeListResponse> {
        let pairs = params.to_pairs();
        let key = QueryKey::new(SCOPE, &pairs);
        let query = normalize_params(&pairs);

        self.cache
            .fetch(key, || self.client.get_json("/api/employees", &query))
            .await
    }

    /// GET /api/employees/search?q=&establishment_id=
    ///
    /// With neither a query nor an establishment there is nothing to search
    /// and no request is made.
    pub async fn search(
        &self,
        query: &str,
        establishment_id: Option<&str>,
    ) -> ClientResult<Vec<Employee>> {
        let pairs = [
            ("q", Some(query.to_string())),
            ("establishment_id", establishment_id.map(str::to_string)),
        ];
        let params = normalize_params(&pairs);
        if params.is_empty() {
            return Ok(Vec::new());
        }

        let key = QueryKey::new("employees/search", &pairs);
        let response: EmployeeSearchResponse = self
            .cache
            .fetch(key, || self.client.get_json("/api/employees/search", &params))
            .await?;
        Ok(response.employees)
    }

    /// GET /api/employees/suggestions/names?q=
    pub async fn name_suggestions(&self, query: &str) -> ClientResult<Vec<String>> {
        let query = query.trim();
        if query.chars().count() < MIN_SUGGESTION_QUERY {
            return Ok(Vec::new());
        }

        let pairs = [("q", Some(query.to_string()))];
        let key = QueryKey::new("employees/suggestions", &pairs);
        let params = normalize_params(&pairs);
        let response: NameSuggestionsResponse = self
            .cache
            .fetch(key, || {
                self.client
                    .get_json("/api/employees/suggestions/names", &params)
            })
            .await?;
        Ok(response.suggestions)
    }

    /// GET /api/employees/:id/validation-stats
    pub async fn validation_stats(&self, employee_id: &str) -> ClientResult<ValidationStats> {
        validate_entity_id(employee_id).map_err(ClientError::Validation)?;
        let path = format!(
            "/api/employees/{}/validation-stats",
            encode_segment(employee_id)
        );

        self.cache
            .fetch(stats_key(employee_id), || self.client.get_json(&path, &[]))
            .await
    }

    /// POST /api/employees/:id/validation-vote
    pub async fn vote(
        &self,
        employee_id: &str,
        vote_type: VoteType,
    ) -> ClientResult<MessageResponse> {
        validate_entity_id(employee_id).map_err(ClientError::Validation)?;
        let path = format!(
            "/api/employees/{}/validation-vote",
            encode_segment(employee_id)
        );

        let response = self
            .client
            .post_json(&path, &ValidationVoteRequest { vote_type })
            .await?;

        self.cache.invalidate(&stats_key(employee_id)).await;
        info!(employee_id = %employee_id, vote = ?vote_type, "Validation vote recorded");
        Ok(response)
    }

    /// POST /api/employees/:id/request-removal
    pub async fn request_removal(
        &self,
        employee_id: &str,
        reason: &str,
    ) -> ClientResult<MessageResponse> {
        validate_entity_id(employee_id).map_err(ClientError::Validation)?;
        let request = RemovalRequest {
            reason: reason.trim().to_string(),
        };
        let result = ReasonValidator.validate(&request);
        if !result.is_valid {
            return Err(result.into());
        }

        let path = format!(
            "/api/employees/{}/request-removal",
            encode_segment(employee_id)
        );
        let response = self.client.post_json(&path, &request).await?;

        self.cache.invalidate_prefix(SCOPE).await;
        info!(employee_id = %employee_id, "Removal requested");
        Ok(response)
    }

    /// POST /api/employees/:id/deletion-request (multipart)
    pub async fn deletion_request(
        &self,
        employee_id: &str,
        request: &DeletionRequest,
    ) -> ClientResult<MessageResponse> {
        validate_entity_id(employee_id).map_err(ClientError::Validation)?;
        let result = ReasonValidator.validate(request);
        if !result.is_valid {
            return Err(result.into());
        }

        let mut form = Form::new()
            .text("reason", request.reason.trim().to_string())
            .part(
                "document",
                file_part(&request.document, UploadKind::Document).await?,
            );
        if let Some(email) = request.contact_email.as_ref().filter(|e| !e.trim().is_empty()) {
            form = form.text("contact_email", email.trim().to_string());
        }

        let path = format!(
            "/api/employees/{}/deletion-request",
            encode_segment(employee_id)
        );
        let response = self.client.post_multipart(&path, form).await?;

        self.cache.invalidate_prefix(SCOPE).await;
        info!(employee_id = %employee_id, "Deletion request submitted");
        Ok(response)
    }

    /// POST /api/employees/:id/claim
    pub async fn claim(&self, employee_id: &str, message: &str) -> ClientResult<MessageResponse> {
        validate_entity_id(employee_id).map_err(ClientError::Validation)?;
        let request = ClaimRequest {
            message: message.trim().to_string(),
        };
        let result = ReasonValidator.validate(&request);
        if !result.is_valid {
            return Err(result.into());
        }

        let path = format!("/api/employees/{}/claim", encode_segment(employee_id));
        let response = self.client.post_json(&path, &request).await?;

        self.cache.invalidate_prefix(SCOPE).await;
        info!(employee_id = %employee_id, "Employee profile claimed");
        Ok(response)
    }
}

fn stats_key(employee_id: &str) -> QueryKey {
    QueryKey::scope(&format!("employees/{}/validation-stats", employee_id))
}
