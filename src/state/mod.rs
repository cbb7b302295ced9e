//! Shared view state and the controller that owns it
//!
//! Lifecycle phases, always in this order:
//! - Idle: waiting for a trigger
//! - Listening: capture outstanding, microphone on
//! - Processing: simulated recognition latency
//! - Responding: speaking the active script

mod controller;
mod view;

pub use controller::{Collaborators, Controller};
pub use view::{Phase, Script, Trigger, ViewSnapshot};
