//! Generation request validation and job-status classification.
//!
//! A [`JobStatus`] is a point-in-time snapshot returned by the backend on
//! every poll. [`classify_status`] turns one snapshot into a
//! [`PollDecision`]; the poll loop itself lives in `vidgen-client`.

use serde::Deserialize;

use crate::error::CoreError;
use crate::models::Provider;
use crate::resolution::{validate_dimensions, Dimensions};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Message used when the backend reports a failure without detail.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Video generation failed";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Binary source image attached to an image-to-video request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    /// MIME type such as `image/png`.
    pub mime_type: String,
    pub file_name: String,
}

/// One user-submitted video job input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<SourceImage>,
    /// Model identifier, e.g. `veo-3.1-fast-generate-preview`.
    pub model: String,
    pub duration_secs: u32,
    pub dimensions: Dimensions,
    pub fps: u32,
}

/// Validate a request before anything is sent to the backend.
///
/// A request needs a non-blank prompt or an attached image (or both).
pub fn validate_generation_request(request: &GenerationRequest) -> Result<(), CoreError> {
    let has_prompt = !request.prompt.trim().is_empty();
    if !has_prompt && request.image.is_none() {
        return Err(CoreError::Validation(
            "Please provide a prompt or an image to generate a video".to_string(),
        ));
    }
    if let Some(image) = &request.image {
        if image.bytes.is_empty() {
            return Err(CoreError::Validation(
                "Attached image is empty".to_string(),
            ));
        }
        if image.mime_type.parse::<mime::Mime>().is_err() {
            return Err(CoreError::Validation(format!(
                "Attached image has an invalid MIME type: '{}'",
                image.mime_type
            )));
        }
    }
    Provider::from_model(&request.model)?;
    validate_dimensions(request.dimensions.width, request.dimensions.height)?;
    if request.fps == 0 {
        return Err(CoreError::Validation(
            "Frame rate must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Status snapshot
// ---------------------------------------------------------------------------

/// Backend job state. Unrecognised values deserialize as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Response body of `GET /videos/{id}/status`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobStatus {
    pub status: JobState,
    #[serde(default)]
    pub progress_percentage: Option<f64>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// What the poll loop should do with one status snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum PollDecision {
    /// Not terminal; keep polling. Progress is clamped to 0-100.
    Pending { progress: Option<u8> },
    /// Terminal success with a playable media URL.
    Completed { video_url: String },
    /// Terminal failure with the backend message (or a generic one).
    Failed { message: String },
}

/// Classify a status snapshot.
///
/// `completed` without a usable `video_url` is **not** terminal success;
/// it is reported as `Pending` so the loop keeps polling.
pub fn classify_status(status: &JobStatus) -> PollDecision {
    match status.status {
        JobState::Completed => match non_blank(status.video_url.as_deref()) {
            Some(url) => PollDecision::Completed {
                video_url: url.to_string(),
            },
            None => PollDecision::Pending {
                progress: clamp_progress(status.progress_percentage),
            },
        },
        JobState::Failed => PollDecision::Failed {
            message: non_blank(status.error_message.as_deref())
                .unwrap_or(DEFAULT_FAILURE_MESSAGE)
                .to_string(),
        },
        JobState::Queued | JobState::Processing | JobState::Unknown => PollDecision::Pending {
            progress: clamp_progress(status.progress_percentage),
        },
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn clamp_progress(progress: Option<f64>) -> Option<u8> {
    progress
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, 100.0).round() as u8)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
