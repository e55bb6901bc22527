// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::backends::sandbox::LocalSandbox;
use crate::component::Component;
use crate::config::{
    load_and_validate_manifest, ComponentManifest, ComponentState, DependencyGraph, RunOptions,
    ScriptConfig, WorkspaceManifest,
};
use crate::errors::WorkspaceError;
use crate::traits::{ComponentSource, GraphProvider};

/// Workspace described by a YAML manifest on disk.
///
/// Serves as both component source and graph provider. Component directories
/// and script paths in the manifest are relative to the manifest's directory.
#[derive(Debug, Clone)]
pub struct YamlWorkspace {
    root: PathBuf,
    manifest: WorkspaceManifest,
}

impl YamlWorkspace {
    /// Load and validate the manifest at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorkspaceError> {
        let path = path.as_ref();
        let manifest = load_and_validate_manifest(path)?;
        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self::from_manifest(root, manifest))
    }

    pub fn from_manifest(root: impl Into<PathBuf>, manifest: WorkspaceManifest) -> Self {
        Self {
            root: root.into(),
            manifest,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run options declared in the manifest.
    pub fn default_options(&self) -> RunOptions {
        self.manifest.options
    }

    /// Declared scripts with their paths resolved against the workspace root.
    pub fn scripts(&self) -> Vec<ScriptConfig> {
        self.manifest
            .scripts
            .iter()
            .map(|script| ScriptConfig {
                path: self.resolve_path(&script.path),
                ..script.clone()
            })
            .collect()
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn component_dir(&self, component: &ComponentManifest) -> PathBuf {
        match &component.dir {
            Some(dir) => self.resolve_path(dir),
            None => self.root.join(&component.id),
        }
    }

    fn entry(&self, id: &str) -> Result<&ComponentManifest, WorkspaceError> {
        self.manifest
            .component(id)
            .ok_or_else(|| WorkspaceError::UnknownComponent(id.to_string()))
    }

    fn ids_in_state(&self, state: ComponentState) -> Vec<String> {
        self.manifest
            .components
            .iter()
            .filter(|c| c.status == state)
            .map(|c| c.id.clone())
            .collect()
    }
}

#[async_trait]
impl ComponentSource for YamlWorkspace {
    async fn get_many(&self, ids: &[String]) -> Result<Vec<String>, WorkspaceError> {
        ids.iter().map(|id| self.entry(id).map(|c| c.id.clone())).collect()
    }

    async fn modified(&self) -> Result<Vec<String>, WorkspaceError> {
        Ok(self.ids_in_state(ComponentState::Modified))
    }

    async fn new_components(&self) -> Result<Vec<String>, WorkspaceError> {
        Ok(self.ids_in_state(ComponentState::New))
    }

    async fn load(&self, ids: &[String]) -> Result<Vec<Component>, WorkspaceError> {
        ids.iter()
            .map(|id| {
                let entry = self.entry(id)?;
                let sandbox = LocalSandbox::new(self.component_dir(entry));
                Ok(Component::new(entry.id.clone(), entry.config(), Box::new(sandbox)))
            })
            .collect()
    }
}

#[async_trait]
impl GraphProvider for YamlWorkspace {
    /// Graph over `ids`; dependencies outside the selection are left out.
    async fn build(&self, ids: &[String]) -> Result<DependencyGraph, WorkspaceError> {
        let mut graph = DependencyGraph::new();
        for id in ids {
            let entry = self.entry(id)?;
            graph.add_node(entry.id.clone());
            for dependency in entry.depends_on.iter().filter(|d| ids.contains(d)) {
                graph.add_dependency(dependency.clone(), entry.id.clone());
            }
        }
        Ok(graph)
    }
}
