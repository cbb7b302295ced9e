//! Headless display that writes each new scene to the log

use tracing::{debug, info};

use super::{DisplaySink, Scene};
use crate::state::ViewSnapshot;

/// Logs a scene whenever its visible content changes
#[derive(Debug, Default)]
pub struct LogDisplay {
    last: Option<Scene>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySink for LogDisplay {
    fn render(&mut self, snapshot: &ViewSnapshot) {
        let scene = Scene::from_snapshot(snapshot);
        if self.last.as_ref() == Some(&scene) {
            return;
        }

        info!(
            clock = %scene.clock,
            mode = scene.mode_label,
            circle = scene.circle_color.hex(),
            mic = scene.mic_color.hex(),
            status = scene.status,
            message = %scene.message,
            "display"
        );
        self.last = Some(scene);
    }

    fn clear(&mut self) {
        debug!("display cleared");
        self.last = None;
    }
}
