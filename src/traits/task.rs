// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::component::Component;

/// What an in-process task gets to see when it runs.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub component: Arc<Component>,
    pub pipeline: String,
    pub cancel: CancellationToken,
}

/// A task registered by another extension and executed inside the orchestrator.
///
/// Returning an error (or panicking) fails the step and the rest of the
/// component's pipeline.
#[async_trait]
pub trait Task: Send + Sync {
    async fn run(&self, ctx: &TaskContext) -> anyhow::Result<()>;

    fn name(&self) -> &str;
}
