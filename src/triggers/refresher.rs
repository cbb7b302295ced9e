//! Keeps the idle clock current

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::info;

use crate::state::Controller;

/// Republishes the idle view on a coarse interval
pub struct DisplayRefresher {
    controller: Arc<Controller>,
    interval: Duration,
}

impl DisplayRefresher {
    pub fn new(controller: Arc<Controller>, interval: Duration) -> Self {
        Self {
            controller,
            interval,
        }
    }

    pub async fn run(self) {
        info!(interval_ms = self.interval.as_millis() as u64, "display refresher started");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            // A running cycle publishes its own snapshots
            self.controller.publish_idle_refresh();
        }
    }
}
