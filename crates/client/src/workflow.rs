//! Generation workflow: submit a job, then poll its status until it
//! reaches a terminal state.
//!
//! [`GenerationController::await_completion`] sleeps a fixed interval on
//! the injected [`Clock`], issues one status request, and repeats up to
//! [`PollConfig::max_attempts`] times. Non-terminal statuses are the only
//! thing retried; an error response or transport failure ends the wait.
//! The loop stops as soon as the [`CancellationToken`] is triggered.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use vidgen_core::generation::{
    classify_status, validate_generation_request, GenerationRequest, JobState, PollDecision,
};
use vidgen_core::models::{clamp_duration, Provider};
use vidgen_core::types::RemoteId;

use crate::api::CreateJobRequest;
use crate::backend::VideoBackend;
use crate::clock::Clock;
use crate::error::ClientError;

/// Default delay between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default poll budget (10 minutes at the default interval).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Tunable parameters for the status poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before each status request.
    pub interval: Duration,
    /// Number of status requests before giving up.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PollConfig {
    /// Upper bound on the time spent sleeping between polls.
    pub fn ceiling(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

/// Reference to a submitted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: RemoteId,
}

/// Progress notification for a non-terminal poll.
#[derive(Debug, Clone, PartialEq)]
pub struct JobProgress {
    pub job_id: RemoteId,
    /// 1-based poll attempt that produced this notification.
    pub attempt: u32,
    pub state: JobState,
    /// Completion percentage (0-100).
    pub percent: u8,
}

/// Successful terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalResult {
    pub job_id: RemoteId,
    /// Playable media URL.
    pub video_url: String,
    /// Number of status requests issued.
    pub attempts: u32,
}

/// Per-wait options supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct AwaitOptions {
    /// Trigger to stop polling; no further requests are scheduled.
    pub cancel: CancellationToken,
    /// Receives a [`JobProgress`] for every non-terminal poll that reports
    /// a percentage. A dropped receiver is ignored.
    pub progress: Option<mpsc::UnboundedSender<JobProgress>>,
}

impl AwaitOptions {
    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            progress: None,
        }
    }
}

/// Drives video generation jobs against a [`VideoBackend`].
///
/// Holds no per-job state: every `submit` + `await_completion` pair is
/// independent and two submissions of the same request create two jobs.
#[derive(Clone)]
pub struct GenerationController {
    backend: Arc<dyn VideoBackend>,
    clock: Arc<dyn Clock>,
    poll: PollConfig,
}

impl GenerationController {
    pub fn new(backend: Arc<dyn VideoBackend>, clock: Arc<dyn Clock>, poll: PollConfig) -> Self {
        Self {
            backend,
            clock,
            poll,
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        self.poll
    }

    /// Validate, upload the optional source image, and create the job.
    ///
    /// The duration is clamped to the provider cap for the request's model.
    pub async fn submit(
        &self,
        request: &GenerationRequest,
        token: &str,
    ) -> Result<JobHandle, ClientError> {
        validate_generation_request(request)?;
        let provider = Provider::from_model(&request.model)?;

        let image_id = match &request.image {
            Some(image) => {
                let uploaded = self
                    .backend
                    .upload_image(image, token)
                    .await
                    .map_err(|e| ClientError::from_api(e, ClientError::Upload, "Image upload failed"))?;
                let id = uploaded.id.ok_or_else(|| {
                    ClientError::Upload("Server did not return an image ID".to_string())
                })?;
                tracing::debug!(image_id = %id, "Source image uploaded");
                Some(id)
            }
            None => None,
        };

        let body = CreateJobRequest {
            prompt: request.prompt.trim().to_string(),
            duration_seconds: clamp_duration(provider, request.duration_secs),
            resolution_width: request.dimensions.width,
            resolution_height: request.dimensions.height,
            fps: request.fps,
            provider,
            image_id,
            provider_specific_params: serde_json::json!({ "model": request.model }),
        };

        let created = self.backend.create_job(&body, token).await.map_err(|e| {
            ClientError::from_api(e, ClientError::Submission, "Failed to start video generation")
        })?;
        let job_id = created.id.ok_or_else(|| {
            ClientError::Submission("Server did not return a valid video ID".to_string())
        })?;

        tracing::info!(
            job_id = %job_id,
            provider = %provider,
            duration_secs = body.duration_seconds,
            with_image = body.image_id.is_some(),
            "Video generation job submitted",
        );

        Ok(JobHandle { job_id })
    }

    /// Poll the job until it completes, fails, times out or is cancelled.
    pub async fn await_completion(
        &self,
        handle: &JobHandle,
        token: &str,
        options: &AwaitOptions,
    ) -> Result<TerminalResult, ClientError> {
        let job_id = handle.job_id.as_str();

        for attempt in 1..=self.poll.max_attempts {
            tokio::select! {
                biased;
                _ = options.cancel.cancelled() => return Err(cancelled(job_id, attempt - 1)),
                _ = self.clock.sleep(self.poll.interval) => {}
            }

            let status = tokio::select! {
                biased;
                _ = options.cancel.cancelled() => return Err(cancelled(job_id, attempt - 1)),
                result = self.backend.job_status(job_id, token) => result.map_err(|e| {
                    tracing::warn!(job_id, attempt, error = %e, "Status check failed");
                    ClientError::from_api(e, ClientError::StatusCheck, "Failed to get video status")
                })?,
            };

            tracing::debug!(
                job_id,
                attempt,
                max_attempts = self.poll.max_attempts,
                status = ?status.status,
                "Polled video status",
            );

            match classify_status(&status) {
                PollDecision::Completed { video_url } => {
                    tracing::info!(job_id, attempt, "Video generation completed");
                    return Ok(TerminalResult {
                        job_id: job_id.to_string(),
                        video_url,
                        attempts: attempt,
                    });
                }
                PollDecision::Failed { message } => {
                    tracing::info!(job_id, attempt, error = %message, "Video generation failed");
                    return Err(ClientError::JobFailed(message));
                }
                PollDecision::Pending { progress } => {
                    if status.status == JobState::Completed {
                        tracing::warn!(job_id, attempt, "Job reported completed without a video URL");
                    }
                    if let (Some(percent), Some(tx)) = (progress, &options.progress) {
                        let _ = tx.send(JobProgress {
                            job_id: job_id.to_string(),
                            attempt,
                            state: status.status,
                            percent,
                        });
                    }
                }
            }
        }

        tracing::warn!(
            job_id,
            attempts = self.poll.max_attempts,
            "Video generation timed out",
        );
        Err(ClientError::JobTimeout {
            attempts: self.poll.max_attempts,
        })
    }

    /// [`submit`](Self::submit) followed by
    /// [`await_completion`](Self::await_completion).
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        token: &str,
        options: &AwaitOptions,
    ) -> Result<TerminalResult, ClientError> {
        let handle = self.submit(request, token).await?;
        self.await_completion(&handle, token, options).await
    }
}

fn cancelled(job_id: &str, polls: u32) -> ClientError {
    tracing::info!(job_id, polls, "Stopped waiting for video generation");
    ClientError::Cancelled
}
