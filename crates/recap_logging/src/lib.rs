#![deny(missing_docs)]
//! Shared logging utilities for the recap workspace.
//!
//! This crate provides the `recap_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger.
//!
//! Every macro accepts an optional `session: <id>;` prefix. When present the
//! line is tagged with the job's session id, so that the output of one job
//! can be grepped out of a log file shared by several runs:
//!
//! ```
//! recap_logging::recap_info!(session: "20240101_120000042"; "opened stream");
//! recap_logging::recap_info!("no session yet");
//! ```

#[doc(hidden)]
pub use log as __log;

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! recap_trace {
    (session: $session:expr; $($arg:tt)*) => {{
        $crate::__log::trace!("[{}] {}", $session, format_args!($($arg)*));
    }};
    ($($arg:tt)*) => {{
        $crate::__log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! recap_debug {
    (session: $session:expr; $($arg:tt)*) => {{
        $crate::__log::debug!("[{}] {}", $session, format_args!($($arg)*));
    }};
    ($($arg:tt)*) => {{
        $crate::__log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! recap_info {
    (session: $session:expr; $($arg:tt)*) => {{
        $crate::__log::info!("[{}] {}", $session, format_args!($($arg)*));
    }};
    ($($arg:tt)*) => {{
        $crate::__log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! recap_warn {
    (session: $session:expr; $($arg:tt)*) => {{
        $crate::__log::warn!("[{}] {}", $session, format_args!($($arg)*));
    }};
    ($($arg:tt)*) => {{
        $crate::__log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! recap_error {
    (session: $session:expr; $($arg:tt)*) => {{
        $crate::__log::error!("[{}] {}", $session, format_args!($($arg)*));
    }};
    ($($arg:tt)*) => {{
        $crate::__log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Never,
    )]);
}
