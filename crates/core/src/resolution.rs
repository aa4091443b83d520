//! Resolution tiers, aspect ratios and the fixed lookup into pixel sizes.
//!
//! The backend takes explicit `resolution_width` / `resolution_height`
//! values; callers pick a tier and an aspect ratio instead.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Named constants
-------------------------------------------------------------------------- */

/// Tier name: HD.
pub const TIER_720P: &str = "720p";

/// Tier name: Full HD.
pub const TIER_1080P: &str = "1080p";

/// Aspect name: landscape.
pub const ASPECT_LANDSCAPE: &str = "16:9";

/// Aspect name: portrait.
pub const ASPECT_PORTRAIT: &str = "9:16";

/// Maximum dimension (width or height) allowed.
const MAX_DIMENSION: u32 = 7680;

/* --------------------------------------------------------------------------
Types
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResolutionTier {
    #[default]
    Hd720,
    FullHd1080,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AspectRatio {
    /// 16:9
    #[default]
    Landscape,
    /// 9:16
    Portrait,
}

/// Explicit output size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ResolutionTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            TIER_720P => Ok(Self::Hd720),
            TIER_1080P => Ok(Self::FullHd1080),
            other => Err(CoreError::Validation(format!(
                "Unknown resolution tier: '{other}'. Valid tiers: {TIER_720P}, {TIER_1080P}"
            ))),
        }
    }
}

impl FromStr for AspectRatio {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            ASPECT_LANDSCAPE => Ok(Self::Landscape),
            ASPECT_PORTRAIT => Ok(Self::Portrait),
            other => Err(CoreError::Validation(format!(
                "Unknown aspect ratio: '{other}'. Valid ratios: {ASPECT_LANDSCAPE}, {ASPECT_PORTRAIT}"
            ))),
        }
    }
}

/* --------------------------------------------------------------------------
Lookup and validation
-------------------------------------------------------------------------- */

/// Pixel size for a (tier, aspect ratio) pair.
pub fn dimensions_for(tier: ResolutionTier, aspect: AspectRatio) -> Dimensions {
    let (long, short) = match tier {
        ResolutionTier::Hd720 => (1280, 720),
        ResolutionTier::FullHd1080 => (1920, 1080),
    };
    match aspect {
        AspectRatio::Landscape => Dimensions {
            width: long,
            height: short,
        },
        AspectRatio::Portrait => Dimensions {
            width: short,
            height: long,
        },
    }
}

/// Validate that width and height are positive and within bounds.
pub fn validate_dimensions(width: u32, height: u32) -> Result<(), CoreError> {
    if width == 0 || height == 0 {
        return Err(CoreError::Validation(
            "Width and height must be greater than 0".to_string(),
        ));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(CoreError::Validation(format!(
            "Dimensions must not exceed {MAX_DIMENSION}px (got {width}x{height})"
        )));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
