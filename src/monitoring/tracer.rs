/*!
 * Structured Tracing
 * Subscriber setup and the per-run span for the scheduler binaries
 *
 * Features:
 * - Run ID generation for log correlation across controller and workers
 * - JSON-formatted logs for structured parsing
 * - Logs on stderr, leaving stdout to the table reports
 */

use crate::core::limits::TRACE_JSON_ENV;
use std::time::Instant;
use tracing::{debug, info, span, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - OSS_TRACE_JSON: Enable JSON output (default: false)
///
/// Calling this twice is harmless; the second subscriber is discarded.
pub fn init_tracing(component: &'static str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(TRACE_JSON_ENV)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        debug!(component, json = use_json, "Structured tracing initialized");
    }
}

/// Generate a unique ID for one controller run
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering a whole controller run
pub struct RunSpan {
    span: tracing::Span,
    start: Instant,
    run_id: String,
}

impl RunSpan {
    pub fn new(total_workers: u32, max_concurrent: u32) -> Self {
        let run_id = generate_run_id();

        let span = span!(
            Level::INFO,
            "run",
            run_id = %run_id,
            total_workers,
            max_concurrent,
            ticks = tracing::field::Empty,
            launched = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            run_id,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    pub fn record_ticks(&self, ticks: u64) {
        self.span.record("ticks", ticks);
    }

    pub fn record_launched(&self, launched: u32) {
        self.span.record("launched", launched);
    }

    pub fn record_outcome(&self, outcome: &str) {
        self.span.record("outcome", outcome);
    }
}

impl Drop for RunSpan {
    fn drop(&mut self) {
        let _entered = self.span.enter();
        info!(
            run_id = %self.run_id,
            wall_ms = self.start.elapsed().as_millis() as u64,
            "Run finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(generate_run_id(), generate_run_id());
    }

    #[test]
    fn test_run_span_keeps_id() {
        let span = RunSpan::new(3, 1);
        assert_eq!(span.run_id().len(), 36);
    }
}
