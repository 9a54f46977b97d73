// src/api/client.rs
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};
use uuid::Uuid;

use crate::common::helpers::join_url;
use crate::common::{ClientConfig, ClientError, ClientResult};

/// HTTP access to the directory API
///
/// Requests made through the `secure` helpers carry the bearer token when one
/// is configured; public reads go out without it.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ClientError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self::with_client(
            http,
            &config.api_base_url,
            config.api_token.clone(),
        ))
    }

    pub fn with_client(http: Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET a JSON resource; empty query values must already be stripped
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> ClientResult<T> {
        let url = self.url(path);
        debug!(url = %url, params = query.len(), "GET");

        let response = self
            .authorize(self.http.get(&url))
            .query(query)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// POST a JSON body
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(url = %url, "POST");

        let response = self
            .authorize(self.http.post(&url))
            .json(body)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// POST a multipart form (file uploads), tagged with a fresh request id
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: multipart::Form,
    ) -> ClientResult<T> {
        let url = self.url(path);
        let request_id = Uuid::new_v4().to_string();
        debug!(url = %url, request_id = %request_id, "POST multipart");

        let response = self
            .authorize(self.http.post(&url))
            .header("X-Request-Id", &request_id)
            .multipart(form)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = %status, "API request failed");
            return Err(ClientError::from_status(status.as_u16(), &body));
        }

        // Treat an empty success body as JSON null
        let body = if body.trim().is_empty() { "null" } else { &body };
        serde_json::from_str::<T>(body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}
