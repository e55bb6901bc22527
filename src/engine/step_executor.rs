// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sequential execution of one component's pipeline.
//!
//! Steps run strictly in declaration order and the first failure abandons the
//! rest. Each step is resolved immediately before it runs, so a bad token late in
//! the list does not prevent the earlier steps from executing.

use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::component::Component;
use crate::config::consts::{CANCELLED_REASON, NO_PIPELINE_REASON};
use crate::engine::registry::Registry;
use crate::engine::report::ComponentStatus;
use crate::engine::resolver::{ResolvedStep, StepResolver};
use crate::errors::{PipelineError, SandboxError};
use crate::observability::messages::step::{
    ComponentSkipped, ComponentStarted, StepCompleted, StepFailed, StepStarted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{OutputObserver, TaskContext};

/// Runs pipelines for components, one step at a time.
#[derive(Clone)]
pub struct StepExecutor {
    resolver: StepResolver,
    observer: Arc<dyn OutputObserver>,
}

impl StepExecutor {
    pub fn new(registry: Arc<Registry>, observer: Arc<dyn OutputObserver>) -> Self {
        Self {
            resolver: StepResolver::new(registry),
            observer,
        }
    }

    /// Run `pipeline` for `component` and turn the outcome into a status.
    ///
    /// Never returns an error: a missing pipeline is `Skipped`, anything that goes
    /// wrong while running steps is `Failed`.
    pub async fn visit(
        &self,
        component: Arc<Component>,
        pipeline: &str,
        cancel: &CancellationToken,
    ) -> ComponentStatus {
        let steps = match component.require_pipeline(pipeline) {
            Ok(steps) => steps,
            Err(_) => {
                ComponentSkipped {
                    component_id: component.id(),
                    pipeline,
                    reason: NO_PIPELINE_REASON,
                }
                .log();
                return ComponentStatus::Skipped(NO_PIPELINE_REASON.to_string());
            }
        };

        if cancel.is_cancelled() {
            return ComponentStatus::Skipped(CANCELLED_REASON.to_string());
        }

        let started = ComponentStarted {
            component_id: component.id(),
            pipeline,
            step_count: steps.len(),
        };
        started.log();

        match self.execute_pipeline(&component, &steps, pipeline, cancel).await {
            Ok(()) => ComponentStatus::Succeeded,
            Err(PipelineError::Cancelled) => ComponentStatus::Failed(CANCELLED_REASON.to_string()),
            Err(e) => ComponentStatus::Failed(e.to_string()),
        }
    }

    /// Run `steps` in order, stopping at the first failure.
    pub async fn execute_pipeline(
        &self,
        component: &Arc<Component>,
        steps: &[String],
        pipeline: &str,
        cancel: &CancellationToken,
    ) -> Result<(), PipelineError> {
        for token in steps {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }

            let result = match self.resolver.resolve(token, component) {
                Ok(step) => {
                    let start = Instant::now();
                    StepStarted {
                        component_id: component.id(),
                        step: token,
                        kind: step.kind(),
                    }
                    .log();
                    let result = self.execute(component, &step, token, pipeline, cancel).await;
                    if result.is_ok() {
                        StepCompleted {
                            component_id: component.id(),
                            step: token,
                            duration: start.elapsed(),
                        }
                        .log();
                    }
                    result
                }
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                if !matches!(e, PipelineError::Cancelled) {
                    StepFailed {
                        component_id: component.id(),
                        step: token,
                        reason: &e.to_string(),
                    }
                    .log();
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Execute one resolved step.
    pub async fn execute(
        &self,
        component: &Arc<Component>,
        step: &ResolvedStep,
        token: &str,
        pipeline: &str,
        cancel: &CancellationToken,
    ) -> Result<(), PipelineError> {
        let failure = |reason: String| PipelineError::SandboxExecutionFailure {
            component_id: component.id().to_string(),
            step: token.to_string(),
            reason,
        };

        match step {
            ResolvedStep::Script(path) => {
                let exit = component
                    .sandbox()
                    .run(path, cancel.clone())
                    .await
                    .map_err(|e| sandbox_error(e, &failure))?;
                if exit.is_success() {
                    Ok(())
                } else {
                    Err(failure(exit.to_string()))
                }
            }
            ResolvedStep::InProcessTask(task) => {
                let ctx = TaskContext {
                    component: component.clone(),
                    pipeline: pipeline.to_string(),
                    cancel: cancel.clone(),
                };
                let task = task.clone();
                let handle = tokio::spawn(async move { task.run(&ctx).await });
                let abort = handle.abort_handle();

                tokio::select! {
                    joined = handle => match joined {
                        Ok(Ok(())) => Ok(()),
                        Ok(Err(e)) => Err(failure(format!("{:#}", e))),
                        Err(e) if e.is_panic() => Err(failure("task panicked".into())),
                        Err(e) => Err(failure(e.to_string())),
                    },
                    _ = cancel.cancelled() => {
                        abort.abort();
                        Err(PipelineError::Cancelled)
                    }
                }
            }
            ResolvedStep::ShellCommand(argv) => {
                let mut handle = component
                    .sandbox()
                    .exec(argv, cancel.clone())
                    .await
                    .map_err(|e| sandbox_error(e, &failure))?;

                loop {
                    tokio::select! {
                        chunk = handle.stdout.recv() => match chunk {
                            Some(chunk) => self.observer.on_stdout(component.id(), &chunk),
                            None => break,
                        },
                        _ = cancel.cancelled() => break,
                    }
                }

                let exit = handle
                    .completion
                    .await
                    .map_err(|e| failure(e.to_string()))?
                    .map_err(|e| sandbox_error(e, &failure))?;
                if exit.is_success() {
                    Ok(())
                } else {
                    Err(failure(exit.to_string()))
                }
            }
        }
    }
}

fn sandbox_error(error: SandboxError, failure: &impl Fn(String) -> PipelineError) -> PipelineError {
    match error {
        SandboxError::Cancelled => PipelineError::Cancelled,
        other => failure(other.to_string()),
    }
}
