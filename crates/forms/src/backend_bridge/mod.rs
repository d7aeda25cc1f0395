//! Bridge between the UI thread and a backend worker: commands go out on
//! one channel, results come back on another.

pub mod commands;
pub mod orchestration;
pub mod runtime;
pub mod session;

pub use commands::{BackendCommand, BackendEvent};
pub use orchestration::dispatch_backend_command;
pub use runtime::launch;
pub use session::FormSession;

#[cfg(test)]
#[path = "../tests/backend_bridge_tests.rs"]
mod tests;
