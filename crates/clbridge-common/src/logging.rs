//! Structured logging with a runtime-settable severity.
//!
//! The initial filter comes from the CLBRIDGE_LOG environment variable
//! (debug, trace, info, warn, error; default info). The log-level shim on
//! the bridge surface changes the filter later through [`LogHandle`].

use std::io;
use std::sync::OnceLock;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

/// Severity levels exposed on the bridge surface. Discriminants are
/// stable: embedders pass them to the log-level setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum LogSeverity {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogSeverity {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Off),
            1 => Some(Self::Error),
            2 => Some(Self::Warn),
            3 => Some(Self::Info),
            4 => Some(Self::Debug),
            5 => Some(Self::Trace),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "off" => Some(Self::Off),
            "error" => Some(Self::Error),
            "warn" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    /// Filter directive equivalent to this severity.
    pub fn directive(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    fn filter(self) -> EnvFilter {
        EnvFilter::new(self.directive())
    }
}

/// Handle to the installed filter. Cheap to clone; reloading replaces the
/// filter for every subsequent event.
#[derive(Clone)]
pub struct LogHandle {
    reload: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    /// Set filtering to exactly `severity`.
    pub fn set_severity(&self, severity: LogSeverity) {
        // Fails only if the subscriber is gone, in which case there is
        // nothing to filter anyway.
        let _ = self.reload.reload(severity.filter());
    }
}

/// Build the subscriber stack without installing it. `init_logging` wires
/// the same stack to the global dispatcher; tests that need an isolated
/// subscriber use this directly.
pub fn subscriber_with_writer<W>(
    initial: EnvFilter,
    writer: W,
) -> (impl tracing::Subscriber + Send + Sync + 'static, LogHandle)
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(initial);
    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(writer),
    );
    (subscriber, LogHandle { reload: handle })
}

static HANDLE: OnceLock<LogHandle> = OnceLock::new();

/// Initialize structured logging with environment filter.
/// Set CLBRIDGE_LOG=debug (or trace, info, warn, error) for verbosity
/// control. Runs once per process; later calls return the same handle.
pub fn init_logging() -> LogHandle {
    HANDLE
        .get_or_init(|| {
            let initial = EnvFilter::try_from_env("CLBRIDGE_LOG")
                .unwrap_or_else(|_| EnvFilter::new("info"));
            let (subscriber, handle) = subscriber_with_writer(initial, io::stderr);
            let _ = subscriber.try_init();
            handle
        })
        .clone()
}
