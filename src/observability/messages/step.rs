// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for step resolution and execution.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Component picked up by a worker slot.
pub struct ComponentStarted<'a> {
    pub component_id: &'a str,
    pub pipeline: &'a str,
    pub step_count: usize,
}

impl Display for ComponentStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running '{}' for component '{}' ({} steps)",
            self.pipeline, self.component_id, self.step_count
        )
    }
}

impl StructuredLog for ComponentStarted<'_> {
    fn log(&self) {
        tracing::info!(
            component_id = self.component_id,
            pipeline = self.pipeline,
            step_count = self.step_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "component",
            span_name = name,
            component_id = self.component_id,
            pipeline = self.pipeline,
        )
    }
}

/// Component has nothing to run for this pipeline.
///
/// # Log Level
/// `info!` - Expected, but worth seeing
pub struct ComponentSkipped<'a> {
    pub component_id: &'a str,
    pub pipeline: &'a str,
    pub reason: &'a str,
}

impl Display for ComponentSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipping component '{}' for '{}': {}",
            self.component_id, self.pipeline, self.reason
        )
    }
}

impl StructuredLog for ComponentSkipped<'_> {
    fn log(&self) {
        tracing::info!(
            component_id = self.component_id,
            pipeline = self.pipeline,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "component_skipped",
            span_name = name,
            component_id = self.component_id,
        )
    }
}

/// Step resolved and about to run.
///
/// # Log Level
/// `debug!`
pub struct StepStarted<'a> {
    pub component_id: &'a str,
    pub step: &'a str,
    pub kind: &'a str,
}

impl Display for StepStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Component '{}': running {} step '{}'",
            self.component_id, self.kind, self.step
        )
    }
}

impl StructuredLog for StepStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            component_id = self.component_id,
            step = self.step,
            kind = self.kind,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "step",
            span_name = name,
            component_id = self.component_id,
            step = self.step,
        )
    }
}

pub struct StepCompleted<'a> {
    pub component_id: &'a str,
    pub step: &'a str,
    pub duration: Duration,
}

impl Display for StepCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Component '{}': step '{}' completed in {:?}",
            self.component_id, self.step, self.duration
        )
    }
}

impl StructuredLog for StepCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            component_id = self.component_id,
            step = self.step,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("step_completed", span_name = name, step = self.step)
    }
}

/// Step failed; the rest of the component's pipeline is abandoned.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct StepFailed<'a> {
    pub component_id: &'a str,
    pub step: &'a str,
    pub reason: &'a str,
}

impl Display for StepFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Component '{}': step '{}' failed: {}",
            self.component_id, self.step, self.reason
        )
    }
}

impl StructuredLog for StepFailed<'_> {
    fn log(&self) {
        tracing::error!(
            component_id = self.component_id,
            step = self.step,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "step_failed",
            span_name = name,
            component_id = self.component_id,
            step = self.step,
        )
    }
}
