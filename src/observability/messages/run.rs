// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline run lifecycle events.

use crate::engine::report::RunSummary;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Run started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_pipes::observability::messages::run::RunStarted;
///
/// let msg = RunStarted {
///     pipeline: "build",
///     component_count: 5,
///     parallelism: 4,
///     walker: "topological",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct RunStarted<'a> {
    pub pipeline: &'a str,
    pub component_count: usize,
    pub parallelism: usize,
    pub walker: &'a str,
}

impl Display for RunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running '{}' pipeline for {} components with {} walker, parallelism={}",
            self.pipeline, self.component_count, self.walker, self.parallelism
        )
    }
}

impl StructuredLog for RunStarted<'_> {
    fn log(&self) {
        tracing::info!(
            pipeline = self.pipeline,
            component_count = self.component_count,
            parallelism = self.parallelism,
            walker = self.walker,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run",
            span_name = name,
            pipeline = self.pipeline,
            component_count = self.component_count,
            parallelism = self.parallelism,
        )
    }
}

/// Run finished, whether or not every component succeeded.
///
/// # Log Level
/// `info!` when everything succeeded, `warn!` otherwise
pub struct RunCompleted<'a> {
    pub pipeline: &'a str,
    pub summary: RunSummary,
    pub duration: Duration,
}

impl Display for RunCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline '{}' finished in {:?}: {} succeeded, {} failed, {} blocked, {} skipped",
            self.pipeline,
            self.duration,
            self.summary.succeeded,
            self.summary.failed,
            self.summary.blocked,
            self.summary.skipped
        )
    }
}

impl StructuredLog for RunCompleted<'_> {
    fn log(&self) {
        if self.summary.failed == 0 && self.summary.blocked == 0 {
            tracing::info!(
                pipeline = self.pipeline,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        } else {
            tracing::warn!(
                pipeline = self.pipeline,
                failed = self.summary.failed,
                blocked = self.summary.blocked,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_completed",
            span_name = name,
            pipeline = self.pipeline,
            duration = ?self.duration,
        )
    }
}

/// Run aborted before producing a report.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct RunFailed<'a> {
    pub pipeline: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for RunFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pipeline '{}' aborted: {}", self.pipeline, self.error)
    }
}

impl StructuredLog for RunFailed<'_> {
    fn log(&self) {
        tracing::error!(
            pipeline = self.pipeline,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "run_failed",
            span_name = name,
            pipeline = self.pipeline,
            error = %self.error,
        )
    }
}

/// Cancellation observed; no further layers or steps will start.
pub struct RunCancelled<'a> {
    pub pipeline: &'a str,
    pub pending: usize,
}

impl Display for RunCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline '{}' cancelled, {} components will not run",
            self.pipeline, self.pending
        )
    }
}

impl StructuredLog for RunCancelled<'_> {
    fn log(&self) {
        tracing::warn!(pipeline = self.pipeline, pending = self.pending, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("run_cancelled", span_name = name, pipeline = self.pipeline)
    }
}
