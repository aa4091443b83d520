//! Seams between the workflow/session logic and the HTTP transport.
//!
//! [`VideoApi`] implements both traits; tests substitute in-memory fakes.

use async_trait::async_trait;
use vidgen_core::generation::{JobStatus, SourceImage};

use crate::api::{
    ApiError, AuthResponse, CreateJobRequest, CreatedResource, RegisterPayload, TokenResponse,
    VideoApi,
};

/// Job submission and status endpoints.
#[async_trait]
pub trait VideoBackend: Send + Sync {
    async fn upload_image(&self, image: &SourceImage, token: &str)
        -> Result<CreatedResource, ApiError>;

    async fn create_job(
        &self,
        request: &CreateJobRequest,
        token: &str,
    ) -> Result<CreatedResource, ApiError>;

    async fn job_status(&self, job_id: &str, token: &str) -> Result<JobStatus, ApiError>;
}

/// Credential exchange endpoints.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;

    async fn register(&self, payload: &RegisterPayload) -> Result<AuthResponse, ApiError>;

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ApiError>;
}

#[async_trait]
impl VideoBackend for VideoApi {
    async fn upload_image(
        &self,
        image: &SourceImage,
        token: &str,
    ) -> Result<CreatedResource, ApiError> {
        VideoApi::upload_image(self, image, token).await
    }

    async fn create_job(
        &self,
        request: &CreateJobRequest,
        token: &str,
    ) -> Result<CreatedResource, ApiError> {
        self.generate_video(request, token).await
    }

    async fn job_status(&self, job_id: &str, token: &str) -> Result<JobStatus, ApiError> {
        self.video_status(job_id, token).await
    }
}

#[async_trait]
impl AuthBackend for VideoApi {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        VideoApi::login(self, email, password).await
    }

    async fn register(&self, payload: &RegisterPayload) -> Result<AuthResponse, ApiError> {
        VideoApi::register(self, payload).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ApiError> {
        VideoApi::refresh(self, refresh_token).await
    }
}
