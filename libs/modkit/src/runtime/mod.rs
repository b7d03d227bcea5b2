mod runner;
mod shutdown;

pub use runner::{run, Listener, RunOptions, RunOutcome, ShutdownOptions};
pub use shutdown::wait_for_shutdown;
