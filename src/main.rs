//! lark-daemon: voice-triggered assistant appliance
//!
//! Runs the LARK interaction cycle (idle, listening, processing,
//! responding) and delivers one of two canned scripts through speech:
//! - a rights recitation
//! - a Louisiana statute lookup
//!
//! Cycles are started by independent trigger loops (wake-word polling,
//! an idle auto-demo, optional line commands) that all go through one
//! admission gate, while a refresher keeps the idle display current.
//! There is no real speech recognition; presence is a size heuristic on
//! the captured recording.

mod audio;
mod config;
mod content;
mod display;
mod events;
mod lifecycle;
mod speech;
mod state;
mod triggers;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::audio::{AudioGateway, RecorderGateway};
use crate::config::Config;
use crate::content::ContentStore;
use crate::display::LogDisplay;
use crate::events::StateEvent;
use crate::lifecycle::Teardown;
use crate::state::{Collaborators, Controller};
use crate::triggers::{
    spawn_stdin_reader, AutoDemoScheduler, DisplayRefresher, ManualTrigger, WakeWordLoop,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "lark-daemon starting");

    // Load configuration
    let config = Config::load()?;
    info!(
        triggers = ?config.triggers,
        statute = %config.statute_code,
        "configuration loaded"
    );

    // Controller -> event log
    let (event_tx, mut event_rx) = broadcast::channel::<StateEvent>(64);

    // Single renderer task owns the display
    let (display, renderer) = display::spawn_renderer(Box::new(LogDisplay::new()));

    let audio: Arc<dyn AudioGateway> = Arc::new(RecorderGateway::new(
        config.recorder.clone(),
        config.audio_file.clone(),
        config.presence_threshold,
    ));
    let speech = speech::detect(&config.voice).await;

    let controller = Arc::new(Controller::new(
        Collaborators {
            content: ContentStore::new(config.prefixes.clone()),
            audio: Arc::clone(&audio),
            speech: Arc::clone(&speech),
            display: display.clone(),
        },
        config.timings,
        config.statute_code.clone(),
        event_tx,
    ));

    controller.publish_current();
    let greeting = format!("LARK version {} activated", env!("CARGO_PKG_VERSION"));
    if let Err(e) = speech.speak(&greeting).await {
        warn!(error = %e, "startup announcement failed");
    }

    // Start the enabled trigger loops
    let mut loops = JoinSet::new();
    if config.triggers.refresher {
        loops.spawn(DisplayRefresher::new(Arc::clone(&controller), config.refresh_interval).run());
    }
    if config.triggers.wake_word {
        loops.spawn(
            WakeWordLoop::new(
                Arc::clone(&controller),
                Arc::clone(&audio),
                config.poll_interval,
                config.wake_capture,
            )
            .run(),
        );
    }
    if config.triggers.auto_demo {
        loops.spawn(AutoDemoScheduler::new(Arc::clone(&controller), config.idle_timeout).run());
    }
    if config.triggers.manual {
        loops.spawn(ManualTrigger::new(Arc::clone(&controller)).run(spawn_stdin_reader()));
    }

    info!(loops = loops.len(), "daemon initialized, entering main loop");

    tokio::select! {
        // Log state events as they happen
        _ = async {
            loop {
                match event_rx.recv().await {
                    Ok(event) => {
                        info!(%event, "state event");
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "state event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        } => {
            info!("state event handler exited");
        }

        // Wait for shutdown signal
        result = lifecycle::wait_for_signal() => {
            match result {
                Ok(signal) => info!(signal, "shutdown signal received"),
                Err(e) => error!(?e, "failed to listen for shutdown signals"),
            }
        }
    }

    // Cleanup
    info!("shutting down...");

    Teardown {
        loops,
        display,
        renderer,
        scratch: config.audio_file.clone(),
    }
    .run()
    .await;

    info!("lark-daemon stopped");

    Ok(())
}
