// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::component::Component;
use crate::config::DependencyGraph;
use crate::errors::WorkspaceError;

/// Where components come from: selection by id or by change state, and loading.
#[async_trait]
pub trait ComponentSource: Send + Sync {
    /// Resolve explicitly requested ids, failing on unknown ones.
    async fn get_many(&self, ids: &[String]) -> Result<Vec<String>, WorkspaceError>;

    /// Ids of components changed since their last stored version.
    async fn modified(&self) -> Result<Vec<String>, WorkspaceError>;

    /// Ids of components that have never been stored.
    async fn new_components(&self) -> Result<Vec<String>, WorkspaceError>;

    /// Load components in the order given, each with a fresh sandbox.
    async fn load(&self, ids: &[String]) -> Result<Vec<Component>, WorkspaceError>;
}

/// Builds the dependency graph for a set of component ids.
#[async_trait]
pub trait GraphProvider: Send + Sync {
    async fn build(&self, ids: &[String]) -> Result<DependencyGraph, WorkspaceError>;
}
