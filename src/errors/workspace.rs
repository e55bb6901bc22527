// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for workspace manifest loading and component lookup.

use std::path::PathBuf;
use thiserror::Error;

/// Structural problems found while validating a workspace manifest.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two components share the same id.
    #[error("Duplicate component ID: '{component_id}'")]
    DuplicateComponentId { component_id: String },

    /// A component depends on an id the manifest does not declare.
    #[error("Component '{component_id}' depends on '{missing_dependency}' which does not exist")]
    UnresolvedDependency {
        component_id: String,
        missing_dependency: String,
    },

    /// A registered script is missing its extension or path.
    #[error("Script entry #{index} is incomplete: {reason}")]
    IncompleteScript { index: usize, reason: String },
}

/// Errors raised by a component source or graph provider.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Failed to read manifest '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid manifest: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Invalid(Vec<ValidationError>),

    #[error("Unknown component '{0}'")]
    UnknownComponent(String),
}
