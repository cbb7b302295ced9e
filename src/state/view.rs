//! Shared view state and the lifecycle phases it moves through

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// The four lifecycle phases of an interaction cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for a trigger
    #[default]
    Idle,
    /// Microphone capture outstanding
    Listening,
    /// Simulated recognition latency
    Processing,
    /// Speaking the active script
    Responding,
}

impl Phase {
    /// The only phase this one may move to
    pub fn next(self) -> Self {
        match self {
            Phase::Idle => Phase::Listening,
            Phase::Listening => Phase::Processing,
            Phase::Processing => Phase::Responding,
            Phase::Responding => Phase::Idle,
        }
    }

    /// Status line shown under the status circle
    pub fn status_text(self) -> &'static str {
        match self {
            Phase::Idle => "Ready. Say \"Hey LARK\" to activate.",
            Phase::Listening => "Listening...",
            Phase::Processing => "Processing...",
            Phase::Responding => "Responding...",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Listening => write!(f, "Listening"),
            Phase::Processing => write!(f, "Processing"),
            Phase::Responding => write!(f, "Responding"),
        }
    }
}

/// The canned script a cycle delivers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Script {
    #[default]
    RightsRecitation,
    StatuteLookup,
}

impl Script {
    /// The other script, for demo rotation
    pub fn toggled(self) -> Self {
        match self {
            Script::RightsRecitation => Script::StatuteLookup,
            Script::StatuteLookup => Script::RightsRecitation,
        }
    }

    /// Mode label on the display
    pub fn label(self) -> &'static str {
        match self {
            Script::RightsRecitation => "MIRANDA",
            Script::StatuteLookup => "STATUTE",
        }
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Script::RightsRecitation => write!(f, "RightsRecitation"),
            Script::StatuteLookup => write!(f, "StatuteLookup"),
        }
    }
}

/// Source that admitted a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    WakeWord,
    AutoDemo,
    Manual,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::WakeWord => write!(f, "wake-word"),
            Trigger::AutoDemo => write!(f, "auto-demo"),
            Trigger::Manual => write!(f, "manual"),
        }
    }
}

/// The single mutable record shared by every loop
///
/// Only the controller touches this directly; everything else sees
/// [`ViewSnapshot`] copies.
#[derive(Debug)]
pub(crate) struct ViewState {
    pub phase: Phase,
    pub active_script: Script,
    pub mic_active: bool,
    pub message: Option<String>,
    pub last_updated: DateTime<Local>,
}

impl ViewState {
    pub fn new(script: Script) -> Self {
        Self {
            phase: Phase::Idle,
            active_script: script,
            mic_active: false,
            message: None,
            last_updated: Local::now(),
        }
    }

    /// Move to the next phase in the cycle, keeping `mic_active` in step
    pub fn advance(&mut self) {
        self.phase = self.phase.next();
        self.mic_active = self.phase == Phase::Listening;
        self.last_updated = Local::now();
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            phase: self.phase,
            active_script: self.active_script,
            mic_active: self.mic_active,
            message: self.message.clone(),
            last_updated: self.last_updated,
        }
    }
}

/// Read-only copy of the view state handed to the display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub phase: Phase,
    pub active_script: Script,
    pub mic_active: bool,
    pub message: Option<String>,
    pub last_updated: DateTime<Local>,
}
