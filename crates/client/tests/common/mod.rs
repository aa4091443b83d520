//! Shared fakes for the client integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use vidgen_client::api::{
    ApiError, AuthResponse, CreateJobRequest, CreatedResource, RegisterPayload, TokenResponse,
    UserProfile,
};
use vidgen_client::backend::{AuthBackend, VideoBackend};
use vidgen_client::clock::Clock;
use vidgen_core::generation::{GenerationRequest, JobStatus, SourceImage};
use vidgen_core::resolution::Dimensions;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A real connection failure: the request targets a port nobody listens on.
pub async fn transport_error() -> reqwest::Error {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    reqwest::get(format!("http://{addr}/"))
        .await
        .expect_err("closed port must refuse the connection")
}

pub fn api_error(status: u16, body: &str) -> ApiError {
    ApiError::Api {
        status,
        body: body.to_string(),
    }
}

pub fn status(json: serde_json::Value) -> JobStatus {
    serde_json::from_value(json).expect("status fixture should deserialize")
}

pub fn text_request(prompt: &str, model: &str, duration_secs: u32) -> GenerationRequest {
    GenerationRequest {
        prompt: prompt.to_string(),
        image: None,
        model: model.to_string(),
        duration_secs,
        dimensions: Dimensions {
            width: 1280,
            height: 720,
        },
        fps: 24,
    }
}

pub fn png_image() -> SourceImage {
    SourceImage {
        bytes: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a],
        mime_type: "image/png".to_string(),
        file_name: "seed.png".to_string(),
    }
}

pub fn user() -> UserProfile {
    UserProfile {
        id: "u-1".to_string(),
        email: "ada@example.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        credits_balance: 10.0,
        subscription_tier: "free".to_string(),
        is_verified: true,
    }
}

pub fn token_response(access: &str, expires_in: i64) -> TokenResponse {
    TokenResponse {
        access_token: access.to_string(),
        refresh_token: format!("{access}-refresh"),
        token_type: "bearer".to_string(),
        expires_in,
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Records requested delays and returns immediately.
#[derive(Default)]
pub struct RecordingClock {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingClock {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

#[async_trait]
impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}

/// Cancels `token` on the `nth` sleep (1-based) and then never wakes.
pub struct CancellingClock {
    pub token: CancellationToken,
    pub nth: u32,
    calls: AtomicU32,
}

impl CancellingClock {
    pub fn new(token: CancellationToken, nth: u32) -> Self {
        Self {
            token,
            nth,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl Clock for CancellingClock {
    async fn sleep(&self, _duration: Duration) {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call >= self.nth {
            self.token.cancel();
            std::future::pending::<()>().await;
        }
    }
}

// ---------------------------------------------------------------------------
// Video backend
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum Reply<T> {
    Ok(T),
    Api(u16, &'static str),
    Transport,
}

impl<T: Clone> Reply<T> {
    async fn resolve(&self) -> Result<T, ApiError> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Api(code, body) => Err(api_error(*code, body)),
            Reply::Transport => Err(ApiError::Request(transport_error().await)),
        }
    }
}

/// Scripted [`VideoBackend`].
///
/// Status replies are served in order; once the script is exhausted the
/// `fallback` reply repeats forever.
pub struct FakeVideoBackend {
    pub upload: Reply<CreatedResource>,
    pub create: Reply<CreatedResource>,
    script: Mutex<VecDeque<Reply<JobStatus>>>,
    fallback: Reply<JobStatus>,
    pub upload_calls: AtomicU32,
    pub status_calls: AtomicU32,
    pub created: Mutex<Vec<CreateJobRequest>>,
    pub tokens_seen: Mutex<Vec<String>>,
}

impl FakeVideoBackend {
    pub fn new(script: Vec<Reply<JobStatus>>, fallback: Reply<JobStatus>) -> Self {
        Self {
            upload: Reply::Ok(CreatedResource {
                id: Some("img-1".to_string()),
            }),
            create: Reply::Ok(CreatedResource {
                id: Some("job-1".to_string()),
            }),
            script: Mutex::new(script.into()),
            fallback,
            upload_calls: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
            created: Mutex::new(Vec::new()),
            tokens_seen: Mutex::new(Vec::new()),
        }
    }

    /// Backend whose job never leaves `processing`.
    pub fn always_processing() -> Self {
        Self::new(
            Vec::new(),
            Reply::Ok(status(serde_json::json!({ "status": "processing" }))),
        )
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> u32 {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<CreateJobRequest> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoBackend for FakeVideoBackend {
    async fn upload_image(
        &self,
        _image: &SourceImage,
        token: &str,
    ) -> Result<CreatedResource, ApiError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens_seen.lock().unwrap().push(token.to_string());
        self.upload.resolve().await
    }

    async fn create_job(
        &self,
        request: &CreateJobRequest,
        token: &str,
    ) -> Result<CreatedResource, ApiError> {
        self.created.lock().unwrap().push(request.clone());
        self.tokens_seen.lock().unwrap().push(token.to_string());
        self.create.resolve().await
    }

    async fn job_status(&self, _job_id: &str, token: &str) -> Result<JobStatus, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens_seen.lock().unwrap().push(token.to_string());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(reply) => reply.resolve().await,
            None => self.fallback.resolve().await,
        }
    }
}

// ---------------------------------------------------------------------------
// Auth backend
// ---------------------------------------------------------------------------

/// Scripted [`AuthBackend`] that counts every call.
pub struct FakeAuthBackend {
    pub login: Mutex<Reply<AuthResponse>>,
    pub register: Mutex<Reply<AuthResponse>>,
    pub refresh: Mutex<Reply<TokenResponse>>,
    pub login_calls: AtomicU32,
    pub register_calls: AtomicU32,
    pub refresh_calls: AtomicU32,
    pub registered: Mutex<Vec<RegisterPayload>>,
}

impl FakeAuthBackend {
    /// Every endpoint succeeds; issued access tokens live `expires_in`
    /// seconds.
    pub fn accepting(expires_in: i64) -> Self {
        let auth = AuthResponse {
            user: user(),
            tokens: token_response("access-1", expires_in),
        };
        Self {
            login: Mutex::new(Reply::Ok(auth.clone())),
            register: Mutex::new(Reply::Ok(auth)),
            refresh: Mutex::new(Reply::Ok(token_response("access-2", 3600))),
            login_calls: AtomicU32::new(0),
            register_calls: AtomicU32::new(0),
            refresh_calls: AtomicU32::new(0),
            registered: Mutex::new(Vec::new()),
        }
    }

    pub fn network_calls(&self) -> u32 {
        self.login_calls.load(Ordering::SeqCst)
            + self.register_calls.load(Ordering::SeqCst)
            + self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> u32 {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn set_refresh(&self, reply: Reply<TokenResponse>) {
        *self.refresh.lock().unwrap() = reply;
    }

    pub fn set_login(&self, reply: Reply<AuthResponse>) {
        *self.login.lock().unwrap() = reply;
    }
}

#[async_trait]
impl AuthBackend for FakeAuthBackend {
    async fn login(&self, _email: &str, _password: &str) -> Result<AuthResponse, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.login.lock().unwrap().clone();
        reply.resolve().await
    }

    async fn register(&self, payload: &RegisterPayload) -> Result<AuthResponse, ApiError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        self.registered.lock().unwrap().push(payload.clone());
        let reply = self.register.lock().unwrap().clone();
        reply.resolve().await
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenResponse, ApiError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.refresh.lock().unwrap().clone();
        reply.resolve().await
    }
}
