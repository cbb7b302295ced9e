//! Capture through an external ALSA recorder (`arecord`)

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{capture_limit, AudioGateway, CaptureError, PresenceResult};

/// Records to a scratch file and applies the size heuristic
#[derive(Debug, Clone)]
pub struct RecorderGateway {
    program: String,
    audio_file: PathBuf,
    threshold_bytes: u64,
}

impl RecorderGateway {
    pub fn new(program: impl Into<String>, audio_file: PathBuf, threshold_bytes: u64) -> Self {
        Self {
            program: program.into(),
            audio_file,
            threshold_bytes,
        }
    }

    fn command(&self, duration: Duration) -> Command {
        let secs = duration.as_secs().max(1);
        let mut cmd = Command::new(&self.program);
        cmd.arg("-d")
            .arg(secs.to_string())
            .args(["-f", "cd", "-q"])
            .arg(&self.audio_file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl AudioGateway for RecorderGateway {
    async fn capture(&self, duration: Duration) -> Result<PresenceResult, CaptureError> {
        // A stale recording from an earlier capture must not count as presence
        match tokio::fs::remove_file(&self.audio_file).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(?e, path = ?self.audio_file, "failed to remove stale recording"),
        }

        let child = self.command(duration).spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                CaptureError::ToolUnavailable(self.program.clone())
            } else {
                CaptureError::Failed(e.to_string())
            }
        })?;

        let limit = capture_limit(duration);
        let output = tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| CaptureError::Timeout(limit))?
            .map_err(|e| CaptureError::Failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CaptureError::Failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let captured_bytes = match tokio::fs::metadata(&self.audio_file).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => 0,
            Err(e) => return Err(CaptureError::Failed(e.to_string())),
        };

        let result = PresenceResult::from_recording_size(captured_bytes, self.threshold_bytes);
        debug!(captured_bytes, present = result.present, "capture finished");
        Ok(result)
    }
}
