//! Tracing utilities for query execution observability.
//!
//! Enable the `tracing` feature to emit spans and events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event when a query is handed to the adapter.
///
/// ```ignore
/// quarry_trace_query!(query.target(), query.clauses().len());
/// ```
#[macro_export]
macro_rules! quarry_trace_query {
    ($target:expr, $clause_count:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(target_object = %$target, clauses = $clause_count, "quarry.query");
    };
}

/// Emit a debug-level tracing event for the adapter's answer.
#[macro_export]
macro_rules! quarry_trace_result {
    ($rows:expr, $unhandled:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(rows = $rows, unhandled = $unhandled, "quarry.adapter.result");
    };
}

/// Emit a debug-level tracing event for one fallback pass.
///
/// ```ignore
/// quarry_trace_fallback!("filter", rows.len());
/// ```
#[macro_export]
macro_rules! quarry_trace_fallback {
    ($pass:literal, $rows:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(pass = $pass, rows = $rows, "quarry.fallback");
    };
}

/// Emit a warn-level tracing event when an unhandled clause cannot be applied
/// in memory and is skipped.
#[macro_export]
macro_rules! quarry_trace_dropped {
    ($kind:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!(clause = ?$kind, "quarry.fallback.dropped");
    };
}
