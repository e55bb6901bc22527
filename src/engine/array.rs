// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::component::Component;
use crate::config::consts::CANCELLED_REASON;
use crate::engine::queue::ConcurrencyQueue;
use crate::engine::report::ComponentStatus;
use crate::errors::PipelineError;
use crate::observability::messages::walker::{LayerCompleted, LayerStarted};
use crate::observability::messages::StructuredLog;
use crate::traits::{Visitor, WalkReport, Walker};

/// Submits every component as a single batch, ignoring dependencies.
///
/// Used when topological ordering is switched off. Components start in the
/// order given, bounded only by the queue, and a failure never blocks anyone.
pub struct ArrayWalker {
    components: Vec<Arc<Component>>,
}

impl ArrayWalker {
    pub fn new(components: Vec<Arc<Component>>) -> Self {
        Self { components }
    }
}

#[async_trait]
impl Walker for ArrayWalker {
    async fn walk(
        &mut self,
        visitor: Visitor,
        queue: &ConcurrencyQueue,
        cancel: &CancellationToken,
    ) -> Result<WalkReport, PipelineError> {
        let mut report = WalkReport::new();
        if cancel.is_cancelled() {
            for component in &self.components {
                report.insert(
                    component.id().to_string(),
                    ComponentStatus::Skipped(CANCELLED_REASON.into()),
                );
            }
            return Ok(report);
        }

        let ids: Vec<String> = self.components.iter().map(|c| c.id().to_string()).collect();
        LayerStarted {
            layer: 0,
            components: &ids,
        }
        .log();
        let start = Instant::now();

        let tickets: Vec<_> = self
            .components
            .iter()
            .map(|c| (c.id().to_string(), queue.add(visitor(c.clone()))))
            .collect();
        for (id, ticket) in tickets {
            let status = match ticket.wait().await {
                Ok(status) => status,
                Err(e) => ComponentStatus::Failed(e.to_string()),
            };
            report.insert(id, status);
        }

        LayerCompleted {
            layer: 0,
            component_count: ids.len(),
            duration: start.elapsed(),
        }
        .log();
        Ok(report)
    }

    fn name(&self) -> &'static str {
        "array"
    }
}
