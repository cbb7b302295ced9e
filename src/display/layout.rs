//! Scene layout for the 240x240 appliance screen

use crate::state::{Phase, ViewSnapshot};

/// Longest message that fits the message box
const MESSAGE_MAX_CHARS: usize = 30;

/// Palette used by the appliance screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    CircleBlue,
    Green,
    Yellow,
    Purple,
    Red,
}

impl Color {
    pub fn hex(self) -> &'static str {
        match self {
            Color::CircleBlue => "#0055aa",
            Color::Green => "#00A651",
            Color::Yellow => "#FFC72C",
            Color::Purple => "#7030A0",
            Color::Red => "#FF0000",
        }
    }

    fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Idle => Color::CircleBlue,
            Phase::Listening => Color::Green,
            Phase::Processing => Color::Yellow,
            Phase::Responding => Color::Purple,
        }
    }
}

/// Everything drawn for one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    /// Header clock, `HH:MM`
    pub clock: String,
    pub mic_color: Color,
    pub circle_color: Color,
    pub mode_label: &'static str,
    pub status: &'static str,
    pub message: String,
}

impl Scene {
    pub fn from_snapshot(snapshot: &ViewSnapshot) -> Self {
        let message = match snapshot.phase {
            Phase::Idle => "Welcome to LARK. Say \"Hey LARK\" to activate.",
            Phase::Listening => "I'm listening. What can I help you with?",
            Phase::Processing => "Processing your request...",
            Phase::Responding => snapshot.message.as_deref().unwrap_or_default(),
        };

        Self {
            clock: snapshot.last_updated.format("%H:%M").to_string(),
            mic_color: if snapshot.mic_active {
                Color::Green
            } else {
                Color::Red
            },
            circle_color: Color::for_phase(snapshot.phase),
            mode_label: snapshot.active_script.label(),
            status: snapshot.phase.status_text(),
            message: truncate(message),
        }
    }
}

fn truncate(message: &str) -> String {
    if message.chars().count() <= MESSAGE_MAX_CHARS {
        return message.to_string();
    }
    let head: String = message.chars().take(MESSAGE_MAX_CHARS - 3).collect();
    format!("{head}...")
}
