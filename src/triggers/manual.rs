//! Line commands on an input stream, standing in for the touch buttons

use std::io::BufRead;
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::state::{Controller, Script, Trigger};

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualCommand {
    Start(Script),
    Status,
    /// Look up one statute code, prefixes allowed to be omitted
    Lookup(String),
    /// Keyword search over statute descriptions
    Search(String),
}

impl ManualCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match (word.to_lowercase().as_str(), rest.is_empty()) {
            ("rights" | "miranda", true) => Some(Self::Start(Script::RightsRecitation)),
            ("statute" | "law", true) => Some(Self::Start(Script::StatuteLookup)),
            ("status", true) => Some(Self::Status),
            ("lookup", false) => Some(Self::Lookup(rest.to_string())),
            ("search", false) => Some(Self::Search(rest.to_string())),
            _ => None,
        }
    }
}

pub struct ManualTrigger {
    controller: Arc<Controller>,
}

impl ManualTrigger {
    pub fn new(controller: Arc<Controller>) -> Self {
        Self { controller }
    }

    /// Handle lines until every sender is gone
    pub async fn run(self, mut lines: mpsc::Receiver<String>) {
        info!("manual trigger reading commands");

        while let Some(line) = lines.recv().await {
            self.handle(&line).await;
        }

        info!("manual input closed");
    }

    /// Handle one line; true when it ran a cycle
    pub async fn handle(&self, line: &str) -> bool {
        if line.trim().is_empty() {
            return false;
        }

        match ManualCommand::parse(line) {
            Some(ManualCommand::Start(script)) => {
                if !self.controller.try_start_cycle(script, Trigger::Manual) {
                    info!(%script, "busy, command ignored");
                    return false;
                }
                self.controller.run_cycle().await;
                true
            }
            Some(ManualCommand::Lookup(code)) => {
                match self.controller.content().lookup_statute(&code) {
                    Ok(entry) => info!(code = %entry.code, description = %entry.description, "statute"),
                    Err(e) => info!(error = %e, "statute lookup"),
                }
                false
            }
            Some(ManualCommand::Search(keyword)) => {
                let matches = self.controller.content().search_statutes(&keyword);
                info!(%keyword, count = matches.len(), "statute search");
                for entry in matches {
                    info!(code = %entry.code, description = %entry.description, "match");
                }
                false
            }
            Some(ManualCommand::Status) => {
                let snapshot = self.controller.snapshot();
                info!(
                    phase = %snapshot.phase,
                    script = %snapshot.active_script,
                    mic_active = snapshot.mic_active,
                    "status"
                );
                false
            }
            None => {
                warn!(line = line.trim(), "unknown command");
                false
            }
        }
    }
}

/// Read stdin lines on a dedicated thread
///
/// Blocking reads stay off the runtime so shutdown never waits on the
/// terminal. The thread exits at end of input or once the receiver is
/// dropped.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(8);

    let spawned = thread::Builder::new()
        .name("manual-input".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(?e, "failed to read stdin");
                        break;
                    }
                }
            }
            debug!("manual input thread stopped");
        });

    if let Err(e) = spawned {
        error!(?e, "failed to spawn manual input thread");
    }

    rx
}
