// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::component::Component;
use crate::engine::queue::ConcurrencyQueue;
use crate::engine::report::ComponentStatus;
use crate::errors::PipelineError;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Work performed for each visited component.
pub type Visitor = Arc<dyn Fn(Arc<Component>) -> BoxFuture<ComponentStatus> + Send + Sync>;

/// Final status of every component the walker knew about.
pub type WalkReport = HashMap<String, ComponentStatus>;

/// Drives a visitor over a set of components through a concurrency queue.
///
/// Ordered and unordered walkers share this contract so the runner does not
/// care which one it was given.
#[async_trait]
pub trait Walker: Send {
    async fn walk(
        &mut self,
        visitor: Visitor,
        queue: &ConcurrencyQueue,
        cancel: &CancellationToken,
    ) -> Result<WalkReport, PipelineError>;

    fn name(&self) -> &'static str;
}
