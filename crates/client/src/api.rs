//! REST client for the reel endpoints.
//!
//! Wraps `GET/POST/PUT/DELETE /reels/...` using [`reqwest`] and classifies
//! HTTP failures into [`CoreError`] for the tracker.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use reelgen_core::backend::ReelBackend;
use reelgen_core::error::CoreError;
use reelgen_core::reel::{Reel, ReelCreate, ReelPage, ScriptUpdate};
use reelgen_core::types::DbId;

use crate::config::ClientConfig;

/// HTTP client for one backend.
pub struct ReelApi {
    client: reqwest::Client,
    api_url: String,
    access_token: Option<String>,
}

/// Errors from the REST layer, before classification.
#[derive(Debug, thiserror::Error)]
pub enum ReelApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Reel API error ({status}): {body}")]
    ApiError {
        status: u16,
        /// The `detail` field of the error body when present, else the raw body.
        body: String,
    },
}

/// How a `400 Bad Request` should be read for a given endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadRequestMeaning {
    /// The reel is in the wrong stage for the requested transition.
    InvalidState,
    /// The request payload was rejected.
    Validation,
}

/// FastAPI-style error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl ReelApiError {
    /// Map this error onto the backend error taxonomy.
    ///
    /// Authentication failures are reported as `Unreachable`; the tracker
    /// treats them like any other fatal fetch error.
    pub fn classify(self, reel_id: Option<DbId>, bad_request: BadRequestMeaning) -> CoreError {
        match self {
            ReelApiError::Request(e) => CoreError::Unreachable(e.to_string()),
            ReelApiError::ApiError { status, body } => match StatusCode::from_u16(status) {
                Ok(StatusCode::NOT_FOUND) => match reel_id {
                    Some(id) => CoreError::reel_not_found(id),
                    None => CoreError::Unreachable(format!("endpoint not found: {body}")),
                },
                Ok(StatusCode::BAD_REQUEST) => match bad_request {
                    BadRequestMeaning::InvalidState => CoreError::InvalidState(body),
                    BadRequestMeaning::Validation => CoreError::Validation(body),
                },
                Ok(StatusCode::UNPROCESSABLE_ENTITY) => CoreError::Validation(body),
                Ok(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                    CoreError::Unreachable(format!("session rejected ({status}): {body}"))
                }
                _ => CoreError::Unreachable(format!("HTTP {status}: {body}")),
            },
        }
    }
}

impl ReelApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ReelApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            access_token: config.access_token.clone(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub async fn get_reel(&self, id: DbId) -> Result<Reel, ReelApiError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/reels/{id}"))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    pub async fn put_script(&self, id: DbId, update: &ScriptUpdate) -> Result<Reel, ReelApiError> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/reels/{id}/script"))
            .json(update)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    pub async fn post_generate(&self, id: DbId) -> Result<Reel, ReelApiError> {
        let response = self
            .request(reqwest::Method::POST, &format!("/reels/{id}/generate"))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    pub async fn post_reel(&self, request: &ReelCreate) -> Result<Reel, ReelApiError> {
        let response = self
            .request(reqwest::Method::POST, "/reels/")
            .json(request)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    pub async fn remove_reel(&self, id: DbId) -> Result<(), ReelApiError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/reels/{id}"))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    pub async fn get_page(&self, page: u32, per_page: u32) -> Result<ReelPage, ReelApiError> {
        let response = self
            .request(reqwest::Method::GET, "/reels/")
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Download the final MP4 of a completed reel.
    pub async fn download_reel(&self, id: DbId) -> Result<Vec<u8>, CoreError> {
        let result = async {
            let response = self
                .request(reqwest::Method::GET, &format!("/reels/{id}/download"))
                .send()
                .await?;
            let response = Self::ensure_success(response).await?;
            Ok::<_, ReelApiError>(response.bytes().await?.to_vec())
        }
        .await;

        result.map_err(|e| e.classify(Some(id), BadRequestMeaning::InvalidState))
    }

    // ---- private helpers ----

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        tracing::trace!(%method, path, "Reel API request");
        let builder = self
            .client
            .request(method, format!("{}{}", self.api_url, path));
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Ensure the response has a success status code, extracting the
    /// backend's `detail` message on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ReelApiError> {
        let status = response.status();
        if !status.is_success() {
            let raw = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let body = extract_detail(&raw);
            tracing::debug!(status = status.as_u16(), body = %body, "Reel API returned an error");
            return Err(ReelApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ReelApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Pull the human-readable message out of an error body.
///
/// FastAPI returns either `{"detail": "..."}` or, for schema validation,
/// `{"detail": [{"msg": "..."}, ...]}`.
fn extract_detail(raw: &str) -> String {
    let Ok(body) = serde_json::from_str::<ErrorBody>(raw) else {
        return raw.to_string();
    };
    match body.detail {
        serde_json::Value::String(s) => s,
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

#[async_trait]
impl ReelBackend for ReelApi {
    async fn fetch_reel(&self, id: DbId) -> Result<Reel, CoreError> {
        self.get_reel(id)
            .await
            .map_err(|e| e.classify(Some(id), BadRequestMeaning::InvalidState))
    }

    async fn update_script(&self, id: DbId, update: &ScriptUpdate) -> Result<Reel, CoreError> {
        self.put_script(id, update)
            .await
            .map_err(|e| e.classify(Some(id), BadRequestMeaning::InvalidState))
    }

    async fn request_generation(&self, id: DbId) -> Result<Reel, CoreError> {
        self.post_generate(id)
            .await
            .map_err(|e| e.classify(Some(id), BadRequestMeaning::InvalidState))
    }

    async fn delete_reel(&self, id: DbId) -> Result<(), CoreError> {
        self.remove_reel(id)
            .await
            .map_err(|e| e.classify(Some(id), BadRequestMeaning::InvalidState))
    }

    async fn create_reel(&self, request: &ReelCreate) -> Result<Reel, CoreError> {
        self.post_reel(request)
            .await
            .map_err(|e| e.classify(None, BadRequestMeaning::Validation))
    }

    async fn list_reels(&self, page: u32, per_page: u32) -> Result<ReelPage, CoreError> {
        self.get_page(page, per_page)
            .await
            .map_err(|e| e.classify(None, BadRequestMeaning::Validation))
    }
}
