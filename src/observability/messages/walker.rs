// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for dependency walking: layers, blocking and cycles.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A layer of ready components is about to be submitted.
///
/// # Log Level
/// `debug!` - Scheduling detail
///
/// # Example
/// ```
/// use the_pipes::observability::messages::walker::LayerStarted;
///
/// let components = vec!["core".to_string(), "docs".to_string()];
/// let msg = LayerStarted { layer: 0, components: &components };
///
/// assert_eq!(msg.to_string(), "Layer 0: submitting 2 components [core, docs]");
/// ```
pub struct LayerStarted<'a> {
    pub layer: usize,
    pub components: &'a [String],
}

impl Display for LayerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Layer {}: submitting {} components [{}]",
            self.layer,
            self.components.len(),
            self.components.join(", ")
        )
    }
}

impl StructuredLog for LayerStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            layer = self.layer,
            component_count = self.components.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("layer", span_name = name, layer = self.layer)
    }
}

/// Every component of a layer has finished.
///
/// # Log Level
/// `debug!` - Scheduling detail
pub struct LayerCompleted {
    pub layer: usize,
    pub component_count: usize,
    pub duration: Duration,
}

impl Display for LayerCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Layer {} completed: {} components in {:?}",
            self.layer, self.component_count, self.duration
        )
    }
}

impl StructuredLog for LayerCompleted {
    fn log(&self) {
        tracing::debug!(
            layer = self.layer,
            component_count = self.component_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("layer_completed", span_name = name, layer = self.layer)
    }
}

/// A failure withheld its dependents.
///
/// # Log Level
/// `warn!` - Degraded outcome
pub struct ComponentsBlocked<'a> {
    pub failed_component: &'a str,
    pub blocked: &'a [String],
}

impl Display for ComponentsBlocked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Component '{}' failed; blocking dependents [{}]",
            self.failed_component,
            self.blocked.join(", ")
        )
    }
}

impl StructuredLog for ComponentsBlocked<'_> {
    fn log(&self) {
        tracing::warn!(
            failed_component = self.failed_component,
            blocked_count = self.blocked.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "components_blocked",
            span_name = name,
            failed_component = self.failed_component,
        )
    }
}

/// The dependency graph contains a cycle; the run is aborted.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct CycleDetected<'a> {
    pub cycle: &'a [String],
}

impl Display for CycleDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cyclic dependency detected: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CycleDetected<'_> {
    fn log(&self) {
        tracing::error!(cycle_length = self.cycle.len(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("cycle_detected", span_name = name)
    }
}
