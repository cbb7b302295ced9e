//! Stopping the appliance: signal wait and ordered teardown

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::display::DisplayHandle;

/// How long teardown waits for the display to clear
const DISPLAY_CLEAR_TIMEOUT: Duration = Duration::from_secs(1);

/// Wait for SIGTERM or SIGINT and return its name
///
/// Fails only if the handlers cannot be registered.
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    debug!(signal = name, "shutdown signal");

    Ok(name)
}

/// Everything that has to be stopped or cleaned up on exit
pub struct Teardown {
    /// Trigger and refresher loops
    pub loops: JoinSet<()>,
    pub display: DisplayHandle,
    pub renderer: JoinHandle<()>,
    /// Scratch recording left by the last capture
    pub scratch: PathBuf,
}

impl Teardown {
    /// Abort the loops, blank the display, drop the scratch recording
    ///
    /// A cycle in progress is abandoned at its next await point.
    pub async fn run(mut self) {
        let running = self.loops.len();
        self.loops.shutdown().await;
        debug!(running, "trigger loops stopped");

        self.display.clear_and_stop();
        if tokio::time::timeout(DISPLAY_CLEAR_TIMEOUT, self.renderer)
            .await
            .is_err()
        {
            warn!("display did not clear in time");
        }

        match tokio::fs::remove_file(&self.scratch).await {
            Ok(()) => info!(path = ?self.scratch, "removed scratch recording"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(?e, path = ?self.scratch, "failed to remove scratch recording"),
        }
    }
}
