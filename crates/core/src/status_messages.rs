//! Rotating "still working" messages shown while a job is in flight.
//!
//! Purely cosmetic: the rotation runs on its own timer and is not tied to
//! poll results.

use std::time::Duration;

/// Delay between message rotations.
pub const ROTATION_INTERVAL: Duration = Duration::from_millis(2500);

pub const LOADING_MESSAGES: &[&str] = &[
    "Warming up the AI circuits...",
    "Teaching pixels to dance...",
    "Gathering stardust for rendering...",
    "Consulting with the digital muses...",
    "Compositing visual elements...",
    "Polishing the final frames...",
    "Finalizing the cinematic masterpiece...",
];

/// Index of the message after `current`, wrapping at the end of the list.
pub fn next_message_index(current: usize) -> usize {
    (current + 1) % LOADING_MESSAGES.len()
}
