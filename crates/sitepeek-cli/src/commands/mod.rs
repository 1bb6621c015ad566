//! Command implementations, one module per subcommand.

mod analyze;
mod bundle;
mod fetch;

pub use analyze::execute as analyze;
pub use bundle::execute as bundle;
pub use fetch::execute as fetch;
