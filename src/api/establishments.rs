// src/api/establishments.rs
use tracing::info;

use super::cache::{normalize_params, QueryCache, QueryKey};
use super::client::ApiClient;
use super::models::*;
use super::validators::{validate_entity_id, ReasonValidator};
use crate::common::helpers::encode_segment;
use crate::common::{ClientError, ClientResult, Validator};

const SCOPE: &str = "establishments";

#[derive(Debug, Clone)]
pub struct EstablishmentService {
    client: ApiClient,
    cache: QueryCache,
}

impl EstablishmentService {
    pub fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    /// GET /api/establishments
    pub async fn list(
        &self,
        params: &EstablishmentListParams,
    ) -> ClientResult<EstablishmentListResponse> {
        let pairs = params.to_pairs();
        let key = QueryKey::new(SCOPE, &pairs);
        let query = normalize_params(&pairs);

        self.cache
            .fetch(key, || self.client.get_json("/api/establishments", &query))
            .await
    }

    /// GET /api/establishments/categories
    pub async fn categories(&self) -> ClientResult<Vec<EstablishmentCategory>> {
        let response: CategoriesResponse = self
            .cache
            .fetch(QueryKey::scope("establishments/categories"), || {
                self.client.get_json("/api/establishments/categories", &[])
            })
            .await?;
        Ok(response.categories)
    }

    /// POST /api/establishments/:id/claim
    pub async fn claim(
        &self,
        establishment_id: &str,
        message: &str,
    ) -> ClientResult<MessageResponse> {
        validate_entity_id(establishment_id).map_err(ClientError::Validation)?;
        let request = ClaimRequest {
            message: message.trim().to_string(),
        };
        let result = ReasonValidator.validate(&request);
        if !result.is_valid {
            return Err(result.into());
        }

        let path = format!(
            "/api/establishments/{}/claim",
            encode_segment(establishment_id)
        );
        let response = self.client.post_json(&path, &request).await?;

        self.cache.invalidate_prefix(SCOPE).await;
        info!(establishment_id = %establishment_id, "Establishment ownership claimed");
        Ok(response)
    }
}
