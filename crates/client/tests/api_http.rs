//! HTTP-level tests for [`VideoApi`] against a mock backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use common::{png_image, text_request};
use serde_json::json;
use vidgen_client::api::{ApiError, RegisterPayload, VideoApi};
use vidgen_client::clock::TokioClock;
use vidgen_client::error::ClientError;
use vidgen_client::session::SessionHolder;
use vidgen_client::store::MemorySessionStore;
use vidgen_client::workflow::{AwaitOptions, GenerationController, PollConfig};
use vidgen_core::generation::JobState;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn setup() -> (MockServer, VideoApi) {
    let server = MockServer::start().await;
    let api = VideoApi::new(format!("{}/api/v1/", server.uri()));
    (server, api)
}

fn auth_body(id: serde_json::Value) -> serde_json::Value {
    json!({
        "access_token": "acc",
        "refresh_token": "ref",
        "token_type": "bearer",
        "expires_in": 1800,
        "user": {
            "id": id,
            "email": "ada@example.com",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "credits_balance": 12.5,
            "subscription_tier": "pro",
            "is_verified": true
        }
    })
}

// ---------------------------------------------------------------------------
// Auth endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_login_posts_trimmed_credentials() {
    let (server, api) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "hunter22" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(json!(7))))
        .expect(1)
        .mount(&server)
        .await;

    let response = api.login("  ada@example.com ", "hunter22").await.unwrap();

    assert_eq!(response.user.id, "7");
    assert_eq!(response.user.subscription_tier, "pro");
    assert_eq!(response.tokens.access_token, "acc");
    assert_eq!(response.tokens.expires_in, 1800);
}

#[tokio::test]
async fn test_register_sends_profile_fields() {
    let (server, api) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .and(body_json(json!({
            "email": "ada@example.com",
            "password": "abcdefgh",
            "first_name": "Ada",
            "last_name": "Lovelace"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(auth_body(json!("u-1"))))
        .expect(1)
        .mount(&server)
        .await;

    let payload = RegisterPayload {
        email: "ada@example.com".to_string(),
        password: "abcdefgh".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
    };
    let response = api.register(&payload).await.unwrap();

    assert_eq!(response.user.id, "u-1");
}

#[tokio::test]
async fn test_refresh_posts_refresh_token() {
    let (server, api) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "ref" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "acc-2",
            "refresh_token": "ref-2",
            "expires_in": 1800
        })))
        .mount(&server)
        .await;

    let tokens = api.refresh("ref").await.unwrap();

    assert_eq!(tokens.access_token, "acc-2");
    assert_eq!(tokens.token_type, "bearer");
}

#[tokio::test]
async fn test_login_rejection_keeps_status_and_detail() {
    let (server, api) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "detail": "Incorrect email or password" })),
        )
        .mount(&server)
        .await;

    let err = api.login("ada@example.com", "nope").await.unwrap_err();

    assert_matches!(err, ApiError::Api { status: 401, .. });
    assert_eq!(err.detail().as_deref(), Some("Incorrect email or password"));
}

#[tokio::test]
async fn test_profile_sends_bearer_token() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/user/profile"))
        .and(header("authorization", "Bearer acc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-1",
            "email": "ada@example.com"
        })))
        .mount(&server)
        .await;

    let profile = api.profile("acc").await.unwrap();

    assert_eq!(profile.email, "ada@example.com");
    assert_eq!(profile.credits_balance, 0.0);
}

// ---------------------------------------------------------------------------
// Video endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_upload_image_returns_id() {
    let (server, api) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/images/upload"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "img-9" })))
        .expect(1)
        .mount(&server)
        .await;

    let created = api.upload_image(&png_image(), "tok").await.unwrap();

    assert_eq!(created.id.as_deref(), Some("img-9"));
}

#[tokio::test]
async fn test_status_decodes_snapshot() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/videos/42/status"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "status": "processing",
            "progress_percentage": 55.0,
            "video_url": null
        })))
        .mount(&server)
        .await;

    let status = api.video_status("42", "tok").await.unwrap();

    assert_eq!(status.status, JobState::Processing);
    assert_eq!(status.progress_percentage, Some(55.0));
    assert_eq!(status.video_url, None);
}

/// Reserved characters in a job id stay inside its path segment.
#[tokio::test]
async fn test_status_escapes_job_id() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/videos/a%2Fb%3Fc/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "queued" })))
        .expect(1)
        .mount(&server)
        .await;

    let status = api.video_status("a/b?c", "tok").await.unwrap();

    assert_eq!(status.status, JobState::Queued);
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/videos/42/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = api.video_status("42", "tok").await.unwrap_err();

    assert_matches!(err, ApiError::Decode(_));
}

#[tokio::test]
async fn test_list_videos_accepts_bare_and_wrapped_lists() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/videos/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "prompt": "cats", "status": "completed", "video_url": "https://x/1.mp4" },
            { "id": "2", "status": "failed" }
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/videos/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": 3, "status": "queued" }],
            "total": 1
        })))
        .mount(&server)
        .await;

    let bare = api.list_videos("tok").await.unwrap();
    assert_eq!(bare.len(), 2);
    assert_eq!(bare[0].id, "1");
    assert_eq!(bare[1].video_url, None);

    let wrapped = api.list_videos("tok").await.unwrap();
    assert_eq!(wrapped.len(), 1);
    assert_eq!(wrapped[0].id, "3");
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

/// Sign in, submit a text job and poll it to completion over HTTP.
#[tokio::test]
async fn test_generate_over_http() {
    let (server, api) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(json!("u-1"))))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/videos/generate"))
        .and(header("authorization", "Bearer acc"))
        .and(body_partial_json(json!({
            "prompt": "a lighthouse at dusk",
            "duration_seconds": 20,
            "resolution_width": 1280,
            "resolution_height": 720,
            "fps": 24,
            "provider": "SORA2",
            "provider_specific_params": { "model": "sora-2" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 42 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/videos/42/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "processing" })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/videos/42/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "video_url": "https://cdn.example.com/42.mp4"
        })))
        .mount(&server)
        .await;

    let session = SessionHolder::new(Arc::new(api.clone()), Arc::new(MemorySessionStore::new()));
    session.login("ada@example.com", "hunter22").await.unwrap();
    let token = session.current_token().await.unwrap();

    let controller = GenerationController::new(
        Arc::new(api),
        Arc::new(TokioClock),
        PollConfig {
            interval: Duration::from_millis(1),
            max_attempts: 5,
        },
    );
    let result = controller
        .generate(
            &text_request("a lighthouse at dusk", "sora-2", 25),
            &token,
            &AwaitOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(result.job_id, "42");
    assert_eq!(result.attempts, 3);
    assert_eq!(result.video_url, "https://cdn.example.com/42.mp4");
}

#[tokio::test]
async fn test_status_error_over_http_ends_wait() {
    let (server, api) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/videos/42/status"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "detail": "Not authorized" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let controller = GenerationController::new(
        Arc::new(api),
        Arc::new(TokioClock),
        PollConfig {
            interval: Duration::from_millis(1),
            max_attempts: 5,
        },
    );
    let handle = vidgen_client::workflow::JobHandle {
        job_id: "42".to_string(),
    };
    let err = controller
        .await_completion(&handle, "tok", &AwaitOptions::default())
        .await
        .unwrap_err();

    assert_matches!(err, ClientError::StatusCheck(ref msg) if msg == "Not authorized");
}
