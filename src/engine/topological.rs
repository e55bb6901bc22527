// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::component::Component;
use crate::config::consts::CANCELLED_REASON;
use crate::config::DependencyGraph;
use crate::engine::queue::ConcurrencyQueue;
use crate::engine::report::ComponentStatus;
use crate::errors::PipelineError;
use crate::observability::messages::walker::{
    ComponentsBlocked, CycleDetected, LayerCompleted, LayerStarted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Visitor, WalkReport, Walker};

/// Walks components in dependency order, one layer at a time.
///
/// The walk peels a working copy of the graph: each layer is the current set of
/// sources, submitted as a whole to the shared queue and awaited before its
/// nodes are removed and the next sources are taken. A component that fails
/// blocks everything that transitively depends on it; those components are
/// removed without being visited.
///
/// The graph is checked for cycles before the first layer is submitted, so a
/// cyclic workspace fails fast with the offending path instead of stalling.
///
/// Graph nodes with no loaded component are passed through: they complete
/// instantly so ordering through them is preserved, and they are not reported.
pub struct TopologicalWalker {
    graph: DependencyGraph,
    components: HashMap<String, Arc<Component>>,
}

impl TopologicalWalker {
    /// Components absent from `graph` become isolated nodes.
    pub fn new(mut graph: DependencyGraph, components: Vec<Arc<Component>>) -> Self {
        let components: HashMap<String, Arc<Component>> = components
            .into_iter()
            .map(|c| (c.id().to_string(), c))
            .collect();
        for id in components.keys() {
            if !graph.contains(id) {
                graph.add_node(id.clone());
            }
        }
        Self { graph, components }
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Remove every descendant of `failed` still in `remaining`, marking the
    /// loaded ones as blocked. Returns the newly blocked ids.
    fn block_dependents(
        &self,
        failed: &str,
        remaining: &mut DependencyGraph,
        report: &mut WalkReport,
    ) -> Vec<String> {
        let mut blocked = Vec::new();
        for descendant in self.graph.descendants(failed) {
            if !remaining.remove_node(&descendant) {
                continue;
            }
            if self.components.contains_key(&descendant) {
                report.insert(descendant.clone(), ComponentStatus::Blocked);
                blocked.push(descendant);
            }
        }
        blocked
    }
}

#[async_trait]
impl Walker for TopologicalWalker {
    async fn walk(
        &mut self,
        visitor: Visitor,
        queue: &ConcurrencyQueue,
        cancel: &CancellationToken,
    ) -> Result<WalkReport, PipelineError> {
        if let Some(cycle) = self.graph.find_cycle() {
            CycleDetected { cycle: &cycle }.log();
            return Err(PipelineError::CyclicDependency { cycle });
        }

        let mut remaining = self.graph.clone();
        let mut report = WalkReport::new();
        let mut layer = 0;

        while !remaining.is_empty() {
            if cancel.is_cancelled() {
                for id in remaining.nodes().filter(|id| self.components.contains_key(*id)) {
                    report.insert(id.clone(), ComponentStatus::Skipped(CANCELLED_REASON.into()));
                }
                break;
            }

            let sources = remaining.sources();
            if sources.is_empty() {
                let mut cycle: Vec<String> = remaining.nodes().cloned().collect();
                cycle.sort();
                return Err(PipelineError::CyclicDependency {
                    cycle: remaining.find_cycle().unwrap_or(cycle),
                });
            }

            let (ready, passthrough): (Vec<String>, Vec<String>) = sources
                .into_iter()
                .partition(|id| self.components.contains_key(id));
            for id in &passthrough {
                remaining.remove_node(id);
            }
            if ready.is_empty() {
                continue;
            }

            LayerStarted {
                layer,
                components: &ready,
            }
            .log();
            let start = Instant::now();

            let tickets: Vec<_> = ready
                .iter()
                .filter_map(|id| {
                    let component = self.components.get(id)?.clone();
                    Some((id.clone(), queue.add(visitor(component))))
                })
                .collect();

            for (id, ticket) in tickets {
                let status = match ticket.wait().await {
                    Ok(status) => status,
                    Err(e) => ComponentStatus::Failed(e.to_string()),
                };

                // A failure caused by cancellation leaves its dependents to be
                // reported as cancelled on the next pass.
                if status.is_failed() && !cancel.is_cancelled() {
                    let blocked = self.block_dependents(&id, &mut remaining, &mut report);
                    if !blocked.is_empty() {
                        ComponentsBlocked {
                            failed_component: &id,
                            blocked: &blocked,
                        }
                        .log();
                    }
                }
                remaining.remove_node(&id);
                report.insert(id, status);
            }

            LayerCompleted {
                layer,
                component_count: ready.len(),
                duration: start.elapsed(),
            }
            .log();
            layer += 1;
        }

        Ok(report)
    }

    fn name(&self) -> &'static str {
        "topological"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{Event, Journal, StubSandbox};
    use crate::component::ComponentConfig;
    use crate::engine::registry::Registry;
    use crate::engine::step_executor::StepExecutor;
    use crate::traits::{BoxFuture, TracingObserver};
    use std::time::Duration;

    fn components(journal: &Arc<Journal>, failing: &[&str], ids: &[&str]) -> Vec<Arc<Component>> {
        ids.iter()
            .map(|id| {
                let mut sandbox = StubSandbox::new(*id, journal.clone()).with_delay(Duration::from_millis(5));
                if failing.contains(id) {
                    sandbox = sandbox.failing_on("make");
                }
                Arc::new(Component::new(
                    *id,
                    ComponentConfig::default().with_pipeline("build", vec!["make"]),
                    Box::new(sandbox),
                ))
            })
            .collect()
    }

    fn visitor() -> Visitor {
        let executor = StepExecutor::new(Arc::new(Registry::new()), Arc::new(TracingObserver));
        let cancel = CancellationToken::new();
        Arc::new(move |component: Arc<Component>| -> BoxFuture<ComponentStatus> {
            let executor = executor.clone();
            let cancel = cancel.clone();
            Box::pin(async move { executor.visit(component, "build", &cancel).await })
        })
    }

    #[tokio::test]
    async fn test_dependencies_finish_before_dependents() {
        let journal = Journal::new();
        // core -> api -> web, core -> docs
        let graph = DependencyGraph::from_dependencies(vec![
            ("core", vec![]),
            ("api", vec!["core"]),
            ("web", vec!["api"]),
            ("docs", vec!["core"]),
        ]);
        let mut walker = TopologicalWalker::new(
            graph,
            components(&journal, &[], &["core", "api", "web", "docs"]),
        );

        let queue = ConcurrencyQueue::new(4);
        let report = walker
            .walk(visitor(), &queue, &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.values().all(ComponentStatus::is_succeeded));
        let finished = |id| journal.last_position(id, Event::Finished).unwrap();
        let started = |id| journal.position(id, Event::Started).unwrap();
        assert!(finished("core") < started("api"));
        assert!(finished("core") < started("docs"));
        assert!(finished("api") < started("web"));
    }

    #[tokio::test]
    async fn test_failure_blocks_transitive_dependents_only() {
        let journal = Journal::new();
        let graph = DependencyGraph::from_dependencies(vec![
            ("core", vec![]),
            ("api", vec!["core"]),
            ("web", vec!["api"]),
            ("docs", vec![]),
        ]);
        let mut walker = TopologicalWalker::new(
            graph,
            components(&journal, &["core"], &["core", "api", "web", "docs"]),
        );

        let queue = ConcurrencyQueue::new(2);
        let report = walker
            .walk(visitor(), &queue, &CancellationToken::new())
            .await
            .unwrap();

        assert!(report["core"].is_failed());
        assert_eq!(report["api"], ComponentStatus::Blocked);
        assert_eq!(report["web"], ComponentStatus::Blocked);
        assert_eq!(report["docs"], ComponentStatus::Succeeded);
        assert!(!journal.invoked("api"));
        assert!(!journal.invoked("web"));
    }

    #[tokio::test]
    async fn test_cycle_fails_before_any_work() {
        let journal = Journal::new();
        let graph = DependencyGraph::from_dependencies(vec![
            ("a", vec!["c"]),
            ("b", vec!["a"]),
            ("c", vec!["b"]),
            ("free", vec![]),
        ]);
        let mut walker = TopologicalWalker::new(graph, components(&journal, &[], &["a", "b", "c", "free"]));

        let queue = ConcurrencyQueue::new(2);
        let result = walker.walk(visitor(), &queue, &CancellationToken::new()).await;

        match result {
            Err(PipelineError::CyclicDependency { cycle }) => {
                assert_eq!(cycle.first(), cycle.last());
                assert_eq!(cycle.len(), 4);
            }
            other => panic!("expected CyclicDependency, got {:?}", other),
        }
        assert!(journal.entries().is_empty());
    }

    #[tokio::test]
    async fn test_components_missing_from_graph_still_run() {
        let journal = Journal::new();
        let graph = DependencyGraph::from_dependencies(vec![("core", Vec::<&str>::new())]);
        let mut walker = TopologicalWalker::new(graph, components(&journal, &[], &["core", "loose"]));

        assert!(walker.graph().contains("loose"));
        let queue = ConcurrencyQueue::new(1);
        let report = walker
            .walk(visitor(), &queue, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(report["loose"], ComponentStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_unloaded_nodes_pass_through_and_keep_order() {
        let journal = Journal::new();
        // core -> (ghost, not loaded) -> app
        let graph = DependencyGraph::from_dependencies(vec![
            ("core", vec![]),
            ("ghost", vec!["core"]),
            ("app", vec!["ghost"]),
        ]);
        let mut walker = TopologicalWalker::new(graph, components(&journal, &[], &["core", "app"]));

        let queue = ConcurrencyQueue::new(4);
        let report = walker
            .walk(visitor(), &queue, &CancellationToken::new())
            .await
            .unwrap();

        assert!(!report.contains_key("ghost"));
        assert_eq!(report["app"], ComponentStatus::Succeeded);
        assert!(
            journal.last_position("core", Event::Finished).unwrap()
                < journal.position("app", Event::Started).unwrap()
        );
    }

    #[tokio::test]
    async fn test_cancelled_walk_skips_remaining_layers() {
        let journal = Journal::new();
        let graph = DependencyGraph::from_dependencies(vec![("core", vec![]), ("app", vec!["core"])]);
        let mut walker = TopologicalWalker::new(graph, components(&journal, &[], &["core", "app"]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let queue = ConcurrencyQueue::new(1);
        let report = walker.walk(visitor(), &queue, &cancel).await.unwrap();

        assert_eq!(report["core"], ComponentStatus::Skipped(CANCELLED_REASON.into()));
        assert_eq!(report["app"], ComponentStatus::Skipped(CANCELLED_REASON.into()));
        assert!(journal.entries().is_empty());
    }

    #[tokio::test]
    async fn test_walk_peels_a_copy_of_the_graph() {
        let journal = Journal::new();
        let graph = DependencyGraph::from_dependencies(vec![("core", vec![]), ("app", vec!["core"])]);
        let mut walker = TopologicalWalker::new(graph.clone(), components(&journal, &[], &["core", "app"]));

        let queue = ConcurrencyQueue::new(2);
        for _ in 0..2 {
            let report = walker
                .walk(visitor(), &queue, &CancellationToken::new())
                .await
                .unwrap();
            assert_eq!(report.len(), 2);
            assert!(report.values().all(ComponentStatus::is_succeeded));
        }
        assert_eq!(walker.graph(), &graph);
    }

    #[tokio::test]
    async fn test_failure_blocks_through_unloaded_nodes() {
        let journal = Journal::new();
        // core (fails) -> (ghost, not loaded) -> app
        let graph = DependencyGraph::from_dependencies(vec![
            ("core", vec![]),
            ("ghost", vec!["core"]),
            ("app", vec!["ghost"]),
            ("docs", vec![]),
        ]);
        let mut walker = TopologicalWalker::new(graph, components(&journal, &["core"], &["core", "app", "docs"]));

        let queue = ConcurrencyQueue::new(2);
        let report = walker
            .walk(visitor(), &queue, &CancellationToken::new())
            .await
            .unwrap();

        assert!(report["core"].is_failed());
        assert_eq!(report["app"], ComponentStatus::Blocked);
        assert_eq!(report["docs"], ComponentStatus::Succeeded);
        assert!(!report.contains_key("ghost"));
        assert!(!journal.invoked("app"));
    }
}
