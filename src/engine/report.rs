// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Outcome of one component within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ComponentStatus {
    /// Every step of the pipeline completed.
    Succeeded,
    /// A step failed; later steps did not run.
    Failed(String),
    /// Never executed because a transitive dependency failed.
    Blocked,
    /// Not executed, e.g. no pipeline defined or the run was cancelled first.
    Skipped(String),
}

impl ComponentStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, ComponentStatus::Failed(_))
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, ComponentStatus::Blocked)
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, ComponentStatus::Succeeded)
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentStatus::Succeeded => write!(f, "succeeded"),
            ComponentStatus::Failed(reason) => write!(f, "failed: {}", reason),
            ComponentStatus::Blocked => write!(f, "blocked"),
            ComponentStatus::Skipped(reason) => write!(f, "skipped: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentReport {
    pub id: String,
    pub result: ComponentStatus,
}

/// Counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub blocked: usize,
    pub skipped: usize,
}

/// Result of `Pipes::run`: one entry per selected component, in load order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub pipeline: String,
    pub components: Vec<ComponentReport>,
    pub cancelled: bool,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn new(pipeline: impl Into<String>) -> Self {
        Self {
            pipeline: pipeline.into(),
            components: Vec::new(),
            cancelled: false,
            duration_ms: 0,
        }
    }

    pub fn push(&mut self, id: impl Into<String>, result: ComponentStatus) {
        self.components.push(ComponentReport {
            id: id.into(),
            result,
        });
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_ms = duration.as_millis() as u64;
    }

    pub fn status(&self, id: &str) -> Option<&ComponentStatus> {
        self.components
            .iter()
            .find(|c| c.id == id)
            .map(|c| &c.result)
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for component in &self.components {
            match component.result {
                ComponentStatus::Succeeded => summary.succeeded += 1,
                ComponentStatus::Failed(_) => summary.failed += 1,
                ComponentStatus::Blocked => summary.blocked += 1,
                ComponentStatus::Skipped(_) => summary.skipped += 1,
            }
        }
        summary
    }

    /// True when nothing failed or was blocked.
    pub fn is_success(&self) -> bool {
        let summary = self.summary();
        summary.failed == 0 && summary.blocked == 0
    }
}
