// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::component::ComponentConfig;
use crate::config::consts::DEFAULT_TASK;
use crate::config::options::RunOptions;
use crate::config::validation::validate_manifest;
use crate::errors::WorkspaceError;

/// Workspace manifest: the components of a workspace, their dependencies and
/// pipeline configuration, plus default run options and registered scripts.
///
/// # Example
/// ```yaml
/// options:
///   parallelism: 2
/// scripts:
///   - extension: compiler
///     path: scripts/compile.sh
/// components:
///   - id: utils/strings
///     status: modified
///     extensions:
///       pipes:
///         build: ["compiler", "echo built"]
///   - id: app
///     dir: apps/main
///     depends_on: [utils/strings]
///     extensions:
///       pipes:
///         build: ["compiler:release"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceManifest {
    #[serde(default)]
    pub options: RunOptions,
    #[serde(default)]
    pub scripts: Vec<ScriptConfig>,
    pub components: Vec<ComponentManifest>,
}

/// Change state of a component relative to its last stored version.
///
/// Components that are `new` or `modified` are built when a run names no components.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComponentState {
    New,
    Modified,
    #[default]
    Unchanged,
}

/// One component entry of the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentManifest {
    pub id: String,
    /// Working directory relative to the manifest; defaults to the component id.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub status: ComponentState,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub extensions: HashMap<String, Value>,
}

impl ComponentManifest {
    pub fn config(&self) -> ComponentConfig {
        ComponentConfig {
            extensions: self.extensions.clone(),
        }
    }
}

/// A script registered for `extension:task`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptConfig {
    pub extension: String,
    #[serde(default = "default_task")]
    pub task: String,
    pub path: PathBuf,
}

fn default_task() -> String {
    DEFAULT_TASK.to_string()
}

impl WorkspaceManifest {
    pub fn from_yaml(contents: &str) -> Result<Self, WorkspaceError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn component(&self, id: &str) -> Option<&ComponentManifest> {
        self.components.iter().find(|c| c.id == id)
    }
}

/// Read and parse a manifest without validating it.
pub fn load_manifest<P: AsRef<Path>>(path: P) -> Result<WorkspaceManifest, WorkspaceError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| WorkspaceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    WorkspaceManifest::from_yaml(&contents)
}

/// Read, parse and validate a manifest.
pub fn load_and_validate_manifest<P: AsRef<Path>>(
    path: P,
) -> Result<WorkspaceManifest, WorkspaceError> {
    let manifest = load_manifest(path)?;
    validate_manifest(&manifest).map_err(WorkspaceError::Invalid)?;
    Ok(manifest)
}
