// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Step token resolution.
//!
//! A step token is either `<extension>[:<task>]` or a raw command line. The
//! decision is made against the registry:
//!
//! 1. A token whose extension is registered must resolve to that extension's
//!    script or in-process task (script first). For a token with a colon the
//!    extension is everything before the first `:`. If the task part is malformed
//!    or nothing is registered under it the step fails with `StepResolution`; it
//!    is never run as a shell command.
//! 2. Anything else is a shell command, split on whitespace without quoting.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::component::Component;
use crate::config::consts::DEFAULT_TASK;
use crate::engine::registry::Registry;
use crate::errors::PipelineError;
use crate::traits::Task;

/// What a step token turned out to mean.
#[derive(Clone)]
pub enum ResolvedStep {
    Script(PathBuf),
    InProcessTask(Arc<dyn Task>),
    ShellCommand(Vec<String>),
}

impl ResolvedStep {
    pub fn kind(&self) -> &'static str {
        match self {
            ResolvedStep::Script(_) => "script",
            ResolvedStep::InProcessTask(_) => "task",
            ResolvedStep::ShellCommand(_) => "command",
        }
    }
}

impl fmt::Debug for ResolvedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedStep::Script(path) => f.debug_tuple("Script").field(path).finish(),
            ResolvedStep::InProcessTask(task) => {
                f.debug_tuple("InProcessTask").field(&task.name()).finish()
            }
            ResolvedStep::ShellCommand(argv) => f.debug_tuple("ShellCommand").field(argv).finish(),
        }
    }
}

/// A token that fits the `extension[:task]` grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRef<'a> {
    pub extension: &'a str,
    pub task: Option<&'a str>,
}

impl<'a> StepRef<'a> {
    pub fn parse(token: &'a str) -> Option<Self> {
        if token.is_empty() || token.chars().any(char::is_whitespace) {
            return None;
        }
        let (extension, task) = match token.split_once(':') {
            Some((extension, task)) => (extension, Some(task)),
            None => (token, None),
        };
        if extension.is_empty() {
            return None;
        }
        match task {
            Some(task) if task.is_empty() || task.contains(':') => None,
            _ => Some(Self { extension, task }),
        }
    }

    pub fn task_name(&self) -> &'a str {
        self.task.unwrap_or(DEFAULT_TASK)
    }
}

/// Resolves step tokens against a registry.
#[derive(Debug, Clone)]
pub struct StepResolver {
    registry: Arc<Registry>,
}

impl StepResolver {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn resolve(&self, token: &str, component: &Component) -> Result<ResolvedStep, PipelineError> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::StepResolution {
                token: token.to_string(),
                component_id: component.id().to_string(),
                reason: "empty step".into(),
            });
        }

        let extension = match trimmed.split_once(':') {
            Some((extension, _)) => extension,
            None => trimmed,
        };
        if self.registry.is_registered(extension) {
            return match StepRef::parse(trimmed) {
                Some(step_ref) => self.resolve_registered(trimmed, step_ref, component),
                None => Err(PipelineError::StepResolution {
                    token: token.to_string(),
                    component_id: component.id().to_string(),
                    reason: format!("malformed task reference for extension '{}'", extension),
                }),
            };
        }

        Ok(ResolvedStep::ShellCommand(
            trimmed.split_whitespace().map(str::to_owned).collect(),
        ))
    }

    fn resolve_registered(
        &self,
        token: &str,
        step_ref: StepRef<'_>,
        component: &Component,
    ) -> Result<ResolvedStep, PipelineError> {
        if let Ok(path) = self.registry.get_script(step_ref.extension, step_ref.task) {
            return Ok(ResolvedStep::Script(path.to_path_buf()));
        }
        if let Some(task) = self.registry.get_task(step_ref.extension, step_ref.task_name()) {
            return Ok(ResolvedStep::InProcessTask(task));
        }

        let missing = PipelineError::TaskNotRegistered {
            extension: step_ref.extension.to_string(),
            task: step_ref.task_name().to_string(),
        };
        Err(PipelineError::StepResolution {
            token: token.to_string(),
            component_id: component.id().to_string(),
            reason: missing.to_string(),
        })
    }
}
