//! Fallback scheduler that runs a demo cycle after an idle timeout

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing::{debug, info};

use crate::state::{Controller, Phase, Script, Trigger};

/// Alternates between the two scripts whenever the appliance sits idle
pub struct AutoDemoScheduler {
    controller: Arc<Controller>,
    idle_timeout: Duration,
    next: Script,
}

impl AutoDemoScheduler {
    pub fn new(controller: Arc<Controller>, idle_timeout: Duration) -> Self {
        let next = controller.active_script();
        Self {
            controller,
            idle_timeout,
            next,
        }
    }

    pub async fn run(mut self) {
        info!(idle_secs = self.idle_timeout.as_secs(), "auto-demo scheduler started");
        loop {
            time::sleep(self.idle_timeout).await;
            self.fire().await;
        }
    }

    /// Try to run the next demo; true when it ran
    pub async fn fire(&mut self) -> bool {
        if self.controller.phase() != Phase::Idle {
            return false;
        }

        if !self.controller.try_start_cycle(self.next, Trigger::AutoDemo) {
            debug!("another trigger won the race, retrying after the next timeout");
            return false;
        }

        self.controller.run_cycle().await;

        self.next = self.next.toggled();
        // Keep the displayed mode in step; a trigger that got in first keeps its own
        if !self.controller.select_script(self.next) {
            debug!(next = %self.next, "mode not updated, a cycle is already running");
        }
        true
    }
}
