//! Wake-word polling using the presence placeholder

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::audio::{self, AudioGateway};
use crate::state::{Controller, Phase, Trigger};

/// Polls the microphone while idle and starts a cycle on presence
pub struct WakeWordLoop {
    controller: Arc<Controller>,
    audio: Arc<dyn AudioGateway>,
    poll_interval: Duration,
    capture_duration: Duration,
}

impl WakeWordLoop {
    pub fn new(
        controller: Arc<Controller>,
        audio: Arc<dyn AudioGateway>,
        poll_interval: Duration,
        capture_duration: Duration,
    ) -> Self {
        Self {
            controller,
            audio,
            poll_interval,
            capture_duration,
        }
    }

    pub async fn run(self) {
        info!(poll_ms = self.poll_interval.as_millis() as u64, "wake-word loop started");

        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.poll_once().await;
        }
    }

    /// One polling step; true when this loop ran a cycle
    pub async fn poll_once(&self) -> bool {
        if self.controller.phase() != Phase::Idle {
            return false;
        }

        let presence = audio::capture_or_absent(
            self.audio.as_ref(),
            self.capture_duration,
            audio::capture_limit(self.capture_duration),
        )
        .await;
        if !presence.present {
            return false;
        }

        // Recognition is simulated: the selected mode decides the script
        let script = self.controller.active_script();
        if !self.controller.try_start_cycle(script, Trigger::WakeWord) {
            debug!("presence detected but a cycle is already running");
            return false;
        }

        self.controller.run_cycle().await;
        true
    }
}
