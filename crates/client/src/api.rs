//! REST client for the video-generation backend.
//!
//! Wraps the backend HTTP API (auth, image upload, job creation, job
//! status, listing) using [`reqwest`]. Authenticated calls send
//! `Authorization: Bearer <token>`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;
use vidgen_core::generation::{JobStatus, SourceImage};
use vidgen_core::models::Provider;
use vidgen_core::types::RemoteId;

/// HTTP client for one backend deployment.
#[derive(Clone)]
pub struct VideoApi {
    client: reqwest::Client,
    base_url: String,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Authenticated user as returned by the auth and profile endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "opaque_id")]
    pub id: RemoteId,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub credits_balance: f64,
    #[serde(default)]
    pub subscription_tier: String,
    #[serde(default)]
    pub is_verified: bool,
}

/// Token set returned by login, registration and refresh.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
}

/// Response of `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    #[serde(flatten)]
    pub tokens: TokenResponse,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterPayload {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Body of `POST /videos/generate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateJobRequest {
    pub prompt: String,
    pub duration_seconds: u32,
    pub resolution_width: u32,
    pub resolution_height: u32,
    pub fps: u32,
    pub provider: Provider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<RemoteId>,
    pub provider_specific_params: Value,
}

/// `{ "id": ... }` acknowledgement from upload and job creation.
///
/// The id may be a string or a number; a missing or empty id is `None`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedResource {
    #[serde(default, deserialize_with = "opaque_id_opt")]
    pub id: Option<RemoteId>,
}

/// One entry of the user's generation history.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoSummary {
    #[serde(deserialize_with = "opaque_id")]
    pub id: RemoteId,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `GET /videos/` returns either a bare array or a wrapped list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VideoListing {
    Bare(Vec<VideoSummary>),
    Wrapped {
        #[serde(alias = "items")]
        videos: Vec<VideoSummary>,
    },
}

fn default_token_type() -> String {
    "bearer".to_string()
}

fn id_from_value(value: Value) -> Option<RemoteId> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RemoteId, D::Error> {
    id_from_value(Value::deserialize(deserializer)?)
        .ok_or_else(|| serde::de::Error::custom("expected a string or numeric id"))
}

fn opaque_id_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<RemoteId>, D::Error> {
    Ok(id_from_value(Value::deserialize(deserializer)?))
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The base URL cannot carry path segments.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Backend-provided message for a non-2xx response, if any.
    ///
    /// Understands `{"detail": "..."}`, the list form of `detail` used for
    /// field validation errors, and `message` / `error` keys. Any other
    /// non-empty body is returned verbatim.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Api { body, .. } => extract_detail(body),
            _ => None,
        }
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) else {
        return Some(trimmed.to_string());
    };
    let field = map
        .get("detail")
        .or_else(|| map.get("message"))
        .or_else(|| map.get("error"));
    match field {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(items)) => {
            let messages: Vec<String> = items
                .iter()
                .map(|item| match item.get("msg") {
                    Some(Value::String(msg)) => msg.clone(),
                    _ => item.to_string(),
                })
                .collect();
            Some(messages.join("; "))
        }
        Some(other) => Some(other.to_string()),
        None => Some(trimmed.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

impl VideoApi {
    /// Create a new API client.
    ///
    /// * `base_url` - API root, e.g. `http://localhost:8000/api/v1`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (timeouts and connection pooling are configured there).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /auth/register`.
    pub async fn register(&self, payload: &RegisterPayload) -> Result<AuthResponse, ApiError> {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(payload)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `POST /auth/login`. The email is trimmed before sending.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = serde_json::json!({
            "email": email.trim(),
            "password": password,
        });

        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `POST /auth/refresh`: exchange a refresh token for a new token set.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ApiError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });

        let response = self
            .client
            .post(self.url("/auth/refresh"))
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `GET /user/profile`.
    pub async fn profile(&self, token: &str) -> Result<UserProfile, ApiError> {
        let response = self
            .client
            .get(self.url("/user/profile"))
            .bearer_auth(token)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `POST /images/upload` as multipart form data with a single `file`
    /// part.
    pub async fn upload_image(
        &self,
        image: &SourceImage,
        token: &str,
    ) -> Result<CreatedResource, ApiError> {
        let part = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/images/upload"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `POST /videos/generate`.
    pub async fn generate_video(
        &self,
        request: &CreateJobRequest,
        token: &str,
    ) -> Result<CreatedResource, ApiError> {
        let response = self
            .client
            .post(self.url("/videos/generate"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `GET /videos/{id}/status`.
    pub async fn video_status(&self, job_id: &str, token: &str) -> Result<JobStatus, ApiError> {
        let response = self
            .client
            .get(self.job_status_url(job_id)?)
            .bearer_auth(token)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `GET /videos/`: the caller's generation history.
    pub async fn list_videos(&self, token: &str) -> Result<Vec<VideoSummary>, ApiError> {
        let response = self
            .client
            .get(self.url("/videos/"))
            .bearer_auth(token)
            .send()
            .await?;

        let listing: VideoListing = Self::parse_response(response).await?;
        Ok(match listing {
            VideoListing::Bare(videos) | VideoListing::Wrapped { videos } => videos,
        })
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `<base>/videos/{id}/status` with the id percent-encoded as a single
    /// path segment.
    fn job_status_url(&self, job_id: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["videos", job_id, "status"]);
        Ok(url)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
