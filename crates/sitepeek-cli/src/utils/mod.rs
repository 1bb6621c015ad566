//! Shared helpers for the command implementations.

pub mod logging;
pub mod retry;

pub use logging::initialize_logging;
pub use retry::fetch_with_retries;
