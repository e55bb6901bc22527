// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::consts::DEFAULT_TASK;
use crate::errors::PipelineError;
use crate::traits::Task;

/// Scripts and in-process tasks registered by extensions, keyed by
/// `extension -> task`.
///
/// A registry belongs to one `Pipes` instance. Registration happens before any run;
/// during a run the registry is shared read-only.
///
/// # Examples
/// ```
/// use the_pipes::engine::Registry;
///
/// let mut registry = Registry::new();
/// registry.register_script("compiler", "default", "scripts/compile.sh");
/// registry.register_script("compiler", "release", "scripts/release.sh");
///
/// // The second registration merged into the first instead of replacing it.
/// assert!(registry.get_script("compiler", None).is_ok());
/// assert!(registry.get_script("compiler", Some("release")).is_ok());
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    scripts: HashMap<String, HashMap<String, PathBuf>>,
    tasks: HashMap<String, HashMap<String, Arc<dyn Task>>>,
}

/// Split `extension[:task]`, defaulting the task.
///
/// Returns `None` for names no step token can reach: an empty extension,
/// whitespace, or more than one `:`.
pub(crate) fn split_task_name(name: &str) -> Option<(&str, &str)> {
    if name.chars().any(char::is_whitespace) {
        return None;
    }
    let (extension, task) = match name.split_once(':') {
        Some((extension, task)) if !task.is_empty() => (extension, task),
        Some((extension, _)) => (extension, DEFAULT_TASK),
        None => (name, DEFAULT_TASK),
    };
    if extension.is_empty() || task.contains(':') {
        return None;
    }
    Some((extension, task))
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an in-process task under `extension[:task]`. The last
    /// registration for a name wins.
    pub fn register_task(&mut self, name: &str, handler: Arc<dyn Task>) -> Result<&mut Self, PipelineError> {
        let (extension, task) = split_task_name(name).ok_or_else(|| PipelineError::InvalidTaskName {
            name: name.to_string(),
        })?;
        self.tasks
            .entry(extension.to_string())
            .or_default()
            .insert(task.to_string(), handler);
        Ok(self)
    }

    /// Register a script for `extension:task`, merged into the extension's
    /// existing scripts.
    pub fn register_script(
        &mut self,
        extension: &str,
        task: &str,
        path: impl Into<PathBuf>,
    ) -> &mut Self {
        self.scripts
            .entry(extension.to_string())
            .or_default()
            .insert(task.to_string(), path.into());
        self
    }

    /// Look up a script.
    ///
    /// Without `task` the extension's `default` script is returned.
    pub fn get_script(&self, extension: &str, task: Option<&str>) -> Result<&Path, PipelineError> {
        let scripts = self
            .scripts
            .get(extension)
            .ok_or_else(|| PipelineError::ExtensionNotRegistered {
                extension: extension.to_string(),
            })?;
        let task = task.unwrap_or(DEFAULT_TASK);
        scripts
            .get(task)
            .map(PathBuf::as_path)
            .ok_or_else(|| PipelineError::TaskNotRegistered {
                extension: extension.to_string(),
                task: task.to_string(),
            })
    }

    pub fn get_task(&self, extension: &str, task: &str) -> Option<Arc<dyn Task>> {
        self.tasks.get(extension)?.get(task).cloned()
    }

    /// Whether anything, script or task, was registered for `extension`.
    pub fn is_registered(&self, extension: &str) -> bool {
        self.scripts.contains_key(extension) || self.tasks.contains_key(extension)
    }

    /// All registered extension names, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let names: BTreeSet<&str> = self
            .scripts
            .keys()
            .chain(self.tasks.keys())
            .map(String::as_str)
            .collect();
        names.into_iter().collect()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tasks: Vec<String> = self
            .tasks
            .iter()
            .flat_map(|(ext, tasks)| tasks.keys().map(move |t| format!("{}:{}", ext, t)))
            .collect();
        f.debug_struct("Registry")
            .field("scripts", &self.scripts)
            .field("tasks", &tasks)
            .finish()
    }
}
