//! Process-scope log verbosity for the Hook Manager, read once from
//! `LLTAP_LOGLEVEL` the way the original `HookManager::check_loglevel()`
//! reads it, then used to gate calls into the `log` crate so a `SILENT`
//! setting suppresses Hook Manager diagnostics regardless of the ambient
//! `RUST_LOG` filter.

use std::env;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    Debug,
}

impl LogLevel {
    pub fn from_env() -> Self {
        match env::var("LLTAP_LOGLEVEL") {
            Ok(raw) => match raw.as_str() {
                "SILENT" => LogLevel::Silent,
                "ERROR" => LogLevel::Error,
                "WARN" => LogLevel::Warn,
                "DEBUG" => LogLevel::Debug,
                _ => LogLevel::Error,
            },
            Err(_) => LogLevel::Error,
        }
    }
}

/// Emits `format_args!($fmt, $($arg)*)` through `log::error!` iff the
/// manager's configured level is at least `ERROR`.
macro_rules! lltap_error {
    ($level:expr, $($arg:tt)+) => {
        if $level >= $crate::logging::LogLevel::Error {
            log::error!(target: "lltap::hookmanager", $($arg)+);
        }
    };
}

macro_rules! lltap_warn {
    ($level:expr, $($arg:tt)+) => {
        if $level >= $crate::logging::LogLevel::Warn {
            log::warn!(target: "lltap::hookmanager", $($arg)+);
        }
    };
}

macro_rules! lltap_debug {
    ($level:expr, $($arg:tt)+) => {
        if $level >= $crate::logging::LogLevel::Debug {
            log::debug!(target: "lltap::hookmanager", $($arg)+);
        }
    };
}

pub(crate) use lltap_debug;
pub(crate) use lltap_error;
pub(crate) use lltap_warn;

/// Convenience initializer for tests that want `log` output on stderr; not
/// required by the Hook Manager itself, which only emits through the `log`
/// facade and lets the embedding application choose a subscriber (or none).
#[cfg(test)]
pub fn init_logging() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}
