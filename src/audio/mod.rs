//! Audio gateway: microphone capture and the presence placeholder
//!
//! There is no speech recognizer. Presence is decided by how large the
//! captured recording is, and that heuristic lives entirely in
//! [`PresenceResult`] so a real detector can replace it behind
//! [`AudioGateway`].

mod recorder;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

pub use recorder::RecorderGateway;

/// Captured recordings larger than this are treated as someone speaking
pub const DEFAULT_PRESENCE_THRESHOLD_BYTES: u64 = 10_000;

/// Extra time a capture may take past its requested duration
pub const CAPTURE_GRACE: Duration = Duration::from_secs(2);

/// Upper bound on a capture of `duration`
pub fn capture_limit(duration: Duration) -> Duration {
    duration.saturating_add(CAPTURE_GRACE)
}

/// Outcome of one capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceResult {
    pub present: bool,
    /// Size of the captured recording
    pub captured_bytes: u64,
}

impl PresenceResult {
    /// Placeholder heuristic: a recording over `threshold` bytes counts as presence
    pub fn from_recording_size(captured_bytes: u64, threshold: u64) -> Self {
        Self {
            present: captured_bytes > threshold,
            captured_bytes,
        }
    }

    pub fn absent() -> Self {
        Self {
            present: false,
            captured_bytes: 0,
        }
    }
}

/// Errors that can occur while capturing audio
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("recorder `{0}` is not available")]
    ToolUnavailable(String),

    #[error("capture failed: {0}")]
    Failed(String),

    #[error("capture timed out after {0:?}")]
    Timeout(Duration),
}

/// Microphone capture
#[async_trait]
pub trait AudioGateway: Send + Sync {
    /// Record for `duration` and report whether anyone seems to be there
    async fn capture(&self, duration: Duration) -> Result<PresenceResult, CaptureError>;
}

/// Capture with an upper bound on how long the gateway may take
///
/// Failures and timeouts are logged and reported as no presence.
pub async fn capture_or_absent(
    gateway: &dyn AudioGateway,
    duration: Duration,
    limit: Duration,
) -> PresenceResult {
    match tokio::time::timeout(limit, gateway.capture(duration)).await {
        Ok(Ok(result)) => result,
        Ok(Err(CaptureError::ToolUnavailable(tool))) => {
            debug!(%tool, "recorder unavailable, treating as silence");
            PresenceResult::absent()
        }
        Ok(Err(e)) => {
            warn!(error = %e, "capture failed, treating as silence");
            PresenceResult::absent()
        }
        Err(_) => {
            warn!(?limit, "capture did not finish in time, treating as silence");
            PresenceResult::absent()
        }
    }
}
