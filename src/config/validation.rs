// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Manifest validation.
//!
//! Checks that component ids are unique, that every `depends_on` entry names a
//! declared component and that script registrations are complete. Cycles are not
//! rejected here: the dependency walker detects them before any execution so that
//! the run fails with a `CyclicDependency` error carrying the cycle path.

use std::collections::HashSet;

use crate::config::loader::WorkspaceManifest;
use crate::errors::ValidationError;

/// Validate a manifest, accumulating every problem found.
pub fn validate_manifest(manifest: &WorkspaceManifest) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen_ids = HashSet::new();
    for component in &manifest.components {
        if !seen_ids.insert(component.id.as_str()) {
            errors.push(ValidationError::DuplicateComponentId {
                component_id: component.id.clone(),
            });
        }
    }

    for component in &manifest.components {
        for dependency in &component.depends_on {
            if !seen_ids.contains(dependency.as_str()) {
                errors.push(ValidationError::UnresolvedDependency {
                    component_id: component.id.clone(),
                    missing_dependency: dependency.clone(),
                });
            }
        }
    }

    for (index, script) in manifest.scripts.iter().enumerate() {
        if script.extension.trim().is_empty() {
            errors.push(ValidationError::IncompleteScript {
                index,
                reason: "extension is empty".into(),
            });
        } else if script.extension.contains(':') || script.task.contains(':') {
            errors.push(ValidationError::IncompleteScript {
                index,
                reason: "extension and task must not contain ':'".into(),
            });
        }
        if script.path.as_os_str().is_empty() {
            errors.push(ValidationError::IncompleteScript {
                index,
                reason: "path is empty".into(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
