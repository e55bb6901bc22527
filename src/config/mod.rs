// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod dependency_graph;
mod loader;
mod options;
mod validation;

pub mod consts;

pub use dependency_graph::DependencyGraph;
pub use loader::{
    load_and_validate_manifest, load_manifest, ComponentManifest, ComponentState, ScriptConfig,
    WorkspaceManifest,
};
pub use options::RunOptions;
pub use validation::validate_manifest;
