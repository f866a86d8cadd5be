//! Logging utilities.
//!
//! Logger initialization plus the bridge that routes GPU validation output into
//! the `log` facade.

mod diagnostics;
mod init;

pub use diagnostics::LogDiagnostics;
pub use init::{LoggingConfig, init_logging};
