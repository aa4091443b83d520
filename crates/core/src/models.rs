//! Provider catalogue: which backend model family a model identifier maps
//! to, and how long a clip each family may produce.
//!
//! Duration selection is forgiving: a duration above the active model's cap
//! is reduced to the cap rather than rejected, including when the caller
//! switches models after picking a duration.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Shortest clip any provider accepts.
pub const MIN_DURATION_SECS: u32 = 1;

/// Granularity of the durations offered for selection.
pub const DURATION_STEP_SECS: u32 = 5;

/// Frame rate used when the caller does not pick one.
pub const DEFAULT_FPS: u32 = 24;

/// Model selected when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "veo-3.1-fast-generate-preview";

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Third-party model family that serves a generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "SORA2")]
    Sora2,
    #[serde(rename = "WAN")]
    Wan,
    #[serde(rename = "VEO3")]
    Veo3,
}

impl Provider {
    /// Resolve the provider for a model identifier such as
    /// `sora-1.0-turbo` or `veo-3.1-generate-preview`.
    ///
    /// Matching is a case-insensitive substring test on the family name.
    pub fn from_model(model: &str) -> Result<Self, CoreError> {
        let lower = model.to_ascii_lowercase();
        if lower.contains("sora") {
            Ok(Self::Sora2)
        } else if lower.contains("wan") {
            Ok(Self::Wan)
        } else if lower.contains("veo") {
            Ok(Self::Veo3)
        } else {
            Err(CoreError::Validation(format!(
                "Unknown model '{model}'. Expected a sora, wan or veo model"
            )))
        }
    }

    /// Longest clip this provider will generate, in seconds.
    pub fn max_duration_secs(self) -> u32 {
        match self {
            Self::Sora2 => 20,
            Self::Wan => 30,
            Self::Veo3 => 60,
        }
    }

    /// Wire name sent in the `provider` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sora2 => "SORA2",
            Self::Wan => "WAN",
            Self::Veo3 => "VEO3",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Duration policy
// ---------------------------------------------------------------------------

/// Clamp a requested duration into `[MIN_DURATION_SECS, provider cap]`.
pub fn clamp_duration(provider: Provider, duration_secs: u32) -> u32 {
    duration_secs.clamp(MIN_DURATION_SECS, provider.max_duration_secs())
}

/// Effective duration after the caller switches to `new_model`.
///
/// A duration above the new model's cap is silently reduced to the cap.
pub fn reselect_model(current_duration_secs: u32, new_model: &str) -> Result<u32, CoreError> {
    let provider = Provider::from_model(new_model)?;
    Ok(clamp_duration(provider, current_duration_secs))
}

/// Durations offered for selection: 5-second steps up to the provider cap.
pub fn duration_options(provider: Provider) -> Vec<u32> {
    (1..=provider.max_duration_secs() / DURATION_STEP_SECS)
        .map(|step| step * DURATION_STEP_SECS)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
