//! Shared ambient concerns for the clbridge workspace: logging and
//! platform lookup of the native library.

pub mod logging;
pub mod platform;

pub use logging::{init_logging, LogHandle, LogSeverity};
