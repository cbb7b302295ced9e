use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{SpeechError, SpeechOutput};

const ESPEAK: &str = "espeak";

/// Speaks through the `espeak` command line tool
#[derive(Debug, Clone)]
pub struct EspeakSpeech {
    voice: String,
}

impl EspeakSpeech {
    pub fn new(voice: impl Into<String>) -> Self {
        Self {
            voice: voice.into(),
        }
    }

    /// Returns `None` when `espeak` is not on the PATH
    pub async fn probe(voice: &str) -> Option<Self> {
        let found = Command::new("which")
            .arg(ESPEAK)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false);

        found.then(|| Self::new(voice))
    }
}

#[async_trait]
impl SpeechOutput for EspeakSpeech {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        if text.is_empty() {
            return Ok(());
        }

        debug!(voice = %self.voice, text, "speaking");
        let output = Command::new(ESPEAK)
            .args(["-v", &self.voice])
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    SpeechError::ToolUnavailable(ESPEAK.to_string())
                } else {
                    SpeechError::Failed(e.to_string())
                }
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(SpeechError::Failed(format!(
                "{ESPEAK} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}
