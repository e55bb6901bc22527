// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by the pipeline core: registry lookups, step resolution,
//! step execution and graph traversal.

use thiserror::Error;

use crate::errors::WorkspaceError;

/// Everything that can go wrong while resolving or running a pipeline.
///
/// Only `CyclicDependency`, `Workspace` and `Internal` ever escape `Pipes::run`.
/// The remaining variants are component-local: they are rendered into a
/// `ComponentStatus::Failed` (or `Skipped` for `ConfigurationMissing`) and the
/// run carries on with the other components.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No script or task was ever registered for this extension.
    #[error("Extension '{extension}' is not registered")]
    ExtensionNotRegistered { extension: String },

    /// The extension is known but has no entry for the requested task.
    #[error("Extension '{extension}' has no registered task '{task}'")]
    TaskNotRegistered { extension: String, task: String },

    /// A task name that no step token could ever resolve to.
    #[error("Task name '{name}' must be 'extension' or 'extension:task'")]
    InvalidTaskName { name: String },

    /// A token that names a registered extension did not resolve to a script or task.
    #[error("Step '{token}' of component '{component_id}' could not be resolved: {reason}")]
    StepResolution {
        token: String,
        component_id: String,
        reason: String,
    },

    /// A script, command or in-process task reported failure.
    #[error("Step '{step}' failed for component '{component_id}': {reason}")]
    SandboxExecutionFailure {
        component_id: String,
        step: String,
        reason: String,
    },

    /// The dependency graph cannot be peeled into layers.
    #[error("Cyclic dependency detected: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    /// The component declares no usable pipeline under the requested name.
    #[error("Component '{component_id}' has no '{pipeline}' pipeline defined")]
    ConfigurationMissing {
        component_id: String,
        pipeline: String,
    },

    /// The run was cancelled before the work completed.
    #[error("Run cancelled")]
    Cancelled,

    /// Component discovery, loading or graph construction failed.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error("Internal error: {message}")]
    InternalError { message: String },
}
