//! Events module for controller transitions
//!
//! Provides structured event types for cycle admission, phase changes,
//! spoken lines and cycle completion.

use serde::{Deserialize, Serialize};

use crate::state::{Phase, Script, Trigger};

/// Events emitted by the controller while it drives a cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateEvent {
    /// A trigger won the admission gate
    CycleStarted { script: Script, trigger: Trigger },

    /// The cycle moved to a new phase
    PhaseChanged { from: Phase, to: Phase },

    /// One line was handed to speech output
    LineSpoken {
        /// Position of the line within the response
        index: usize,
        text: String,
        /// False when speech output failed and the line was silent
        spoken: bool,
    },

    /// The cycle returned to Idle
    CycleComplete {
        script: Script,
        /// Wall time from admission to Idle
        duration_ms: u64,
    },
}

impl std::fmt::Display for StateEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateEvent::CycleStarted { script, trigger } => {
                write!(f, "CYCLE_STARTED ({script} via {trigger})")
            }
            StateEvent::PhaseChanged { from, to } => write!(f, "PHASE_CHANGED ({from} -> {to})"),
            StateEvent::LineSpoken { index, spoken, .. } => {
                write!(f, "LINE_SPOKEN (#{index}, spoken={spoken})")
            }
            StateEvent::CycleComplete {
                script,
                duration_ms,
            } => write!(f, "CYCLE_COMPLETE ({script}, {duration_ms}ms)"),
        }
    }
}
