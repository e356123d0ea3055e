//! Logging integration for the odata-rs workspace.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-compilation
//! spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The log level is read from `settings.log_level` (e.g. "debug", "info",
/// "warn", "error"). In debug mode a pretty, human-readable format is used;
/// in production a structured JSON format is used.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one query compilation.
///
/// Enter this span around a compile call so that all log entries emitted
/// while resolving, transforming, and assembling the query include the
/// table name.
///
/// # Examples
///
/// ```
/// use odata_rs_core::logging::compile_span;
///
/// let span = compile_span("Employee");
/// let _guard = span.enter();
/// tracing::debug!("compiling request");
/// ```
pub fn compile_span(table: &str) -> tracing::Span {
    tracing::debug_span!("compile", table = table)
}
