//! Display output
//!
//! The controller and the refresher never touch a [`DisplaySink`]
//! directly. They enqueue snapshots on a [`DisplayHandle`] and one
//! renderer task owns the sink, so there is a single writer.

mod layout;
mod log_sink;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::state::ViewSnapshot;

pub use layout::{Color, Scene};
pub use log_sink::LogDisplay;

/// A rendering target
pub trait DisplaySink: Send {
    fn render(&mut self, snapshot: &ViewSnapshot);

    /// Blank the output
    fn clear(&mut self);
}

/// Work queued for the renderer task
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCommand {
    Render(ViewSnapshot),
    /// Clear the sink and stop the renderer
    ClearAndStop,
}

/// Cheap, cloneable sender side of the renderer queue
#[derive(Debug, Clone)]
pub struct DisplayHandle {
    tx: mpsc::UnboundedSender<DisplayCommand>,
}

impl DisplayHandle {
    /// A handle plus the raw receiving end, for callers that drive rendering themselves
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DisplayCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue a snapshot; never blocks
    pub fn publish(&self, snapshot: ViewSnapshot) {
        if self.tx.send(DisplayCommand::Render(snapshot)).is_err() {
            debug!("renderer stopped, snapshot dropped");
        }
    }

    /// Ask the renderer to blank the display and exit
    pub fn clear_and_stop(&self) {
        let _ = self.tx.send(DisplayCommand::ClearAndStop);
    }
}

/// Start the renderer task that owns `sink`
pub fn spawn_renderer(mut sink: Box<dyn DisplaySink>) -> (DisplayHandle, JoinHandle<()>) {
    let (handle, mut rx) = DisplayHandle::channel();

    let task = tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            match command {
                DisplayCommand::Render(snapshot) => sink.render(&snapshot),
                DisplayCommand::ClearAndStop => {
                    sink.clear();
                    break;
                }
            }
        }
        debug!("renderer stopped");
    });

    (handle, task)
}
