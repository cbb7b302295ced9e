//! Speech output through an external text-to-speech binary
//!
//! When the binary is missing the daemon keeps running with a logging
//! no-op in its place.

mod espeak;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

pub use espeak::EspeakSpeech;

/// Errors that can occur while speaking
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("speech tool `{0}` is not available")]
    ToolUnavailable(String),

    #[error("speech failed: {0}")]
    Failed(String),
}

/// Text-to-speech
///
/// `speak` returns once the utterance has finished playing.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

/// Fallback used when no speech binary is installed
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSpeech;

#[async_trait]
impl SpeechOutput for LogSpeech {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        info!(text, "would speak");
        Ok(())
    }
}

/// Pick espeak when it is installed, otherwise the logging fallback
pub async fn detect(voice: &str) -> Arc<dyn SpeechOutput> {
    match EspeakSpeech::probe(voice).await {
        Some(espeak) => {
            info!(voice, "using espeak for speech output");
            Arc::new(espeak)
        }
        None => {
            warn!("espeak not found, speech output will only be logged");
            Arc::new(LogSpeech)
        }
    }
}
