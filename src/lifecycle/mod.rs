//! Process lifecycle

mod shutdown;

pub use shutdown::{wait_for_signal, Teardown};
