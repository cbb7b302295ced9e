//! Loops that start cycles or keep the idle display fresh
//!
//! Every loop shares the controller's admission gate; none of them
//! touches the view state directly.

mod auto_demo;
mod manual;
mod refresher;
mod wake_word;

pub use auto_demo::AutoDemoScheduler;
pub use manual::{spawn_stdin_reader, ManualTrigger};
pub use refresher::DisplayRefresher;
pub use wake_word::WakeWordLoop;
