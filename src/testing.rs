//! In-crate fakes for the audio, speech and display collaborators

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};

use crate::audio::{AudioGateway, CaptureError, PresenceResult};
use crate::config::CycleTimings;
use crate::content::ContentStore;
use crate::display::{DisplayCommand, DisplayHandle};
use crate::events::StateEvent;
use crate::speech::{SpeechError, SpeechOutput};
use crate::state::{Collaborators, Controller, ViewSnapshot};

#[derive(Debug, Clone, Copy)]
enum AudioBehavior {
    Present,
    Silent,
    Fail,
    Hang,
}

pub struct FakeAudio {
    behavior: AudioBehavior,
    calls: AtomicUsize,
}

impl FakeAudio {
    fn with(behavior: AudioBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn present() -> Self {
        Self::with(AudioBehavior::Present)
    }

    pub fn silent() -> Self {
        Self::with(AudioBehavior::Silent)
    }

    pub fn failing() -> Self {
        Self::with(AudioBehavior::Fail)
    }

    pub fn hanging() -> Self {
        Self::with(AudioBehavior::Hang)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioGateway for FakeAudio {
    async fn capture(&self, _duration: Duration) -> Result<PresenceResult, CaptureError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            AudioBehavior::Present => Ok(PresenceResult::from_recording_size(50_000, 10_000)),
            AudioBehavior::Silent => Ok(PresenceResult::from_recording_size(44, 10_000)),
            AudioBehavior::Fail => Err(CaptureError::Failed("device busy".into())),
            AudioBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(PresenceResult::absent())
            }
        }
    }
}

/// Remembers every line it was asked to speak
#[derive(Default)]
pub struct RecordingSpeech {
    fail: bool,
    lines: Mutex<Vec<String>>,
}

impl RecordingSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

#[async_trait]
impl SpeechOutput for RecordingSpeech {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        self.lines.lock().push(text.to_string());
        if self.fail {
            Err(SpeechError::ToolUnavailable("espeak".into()))
        } else {
            Ok(())
        }
    }
}

/// A controller wired to fakes, with both output channels exposed
pub struct Harness {
    pub controller: Arc<Controller>,
    pub audio: Arc<FakeAudio>,
    pub speech: Arc<RecordingSpeech>,
    display_rx: mpsc::UnboundedReceiver<DisplayCommand>,
    event_rx: broadcast::Receiver<StateEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(FakeAudio::silent(), RecordingSpeech::new(), "14:98")
    }

    pub fn with(audio: FakeAudio, speech: RecordingSpeech, statute_code: &str) -> Self {
        let audio = Arc::new(audio);
        let speech = Arc::new(speech);
        let (display, display_rx) = DisplayHandle::channel();
        let (event_tx, event_rx) = broadcast::channel(256);

        let controller = Controller::new(
            Collaborators {
                content: ContentStore::default(),
                audio: audio.clone(),
                speech: speech.clone(),
                display,
            },
            CycleTimings::default(),
            statute_code.to_string(),
            event_tx,
        );

        Self {
            controller: Arc::new(controller),
            audio,
            speech,
            display_rx,
            event_rx,
        }
    }

    /// Every snapshot published so far
    pub fn snapshots(&mut self) -> Vec<ViewSnapshot> {
        let mut out = vec![];
        while let Ok(command) = self.display_rx.try_recv() {
            if let DisplayCommand::Render(snapshot) = command {
                out.push(snapshot);
            }
        }
        out
    }

    /// Every event emitted so far
    pub fn events(&mut self) -> Vec<StateEvent> {
        let mut out = vec![];
        while let Ok(event) = self.event_rx.try_recv() {
            out.push(event);
        }
        out
    }
}
