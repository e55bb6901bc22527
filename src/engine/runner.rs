// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::component::Component;
use crate::config::consts::NOT_SCHEDULED_REASON;
use crate::config::RunOptions;
use crate::engine::factory::WalkerFactory;
use crate::engine::queue::ConcurrencyQueue;
use crate::engine::registry::Registry;
use crate::engine::report::{ComponentStatus, RunReport};
use crate::engine::step_executor::StepExecutor;
use crate::errors::PipelineError;
use crate::observability::messages::run::{RunCancelled, RunCompleted, RunFailed, RunStarted};
use crate::observability::messages::StructuredLog;
use crate::traits::{
    BoxFuture, ComponentSource, GraphProvider, OutputObserver, Task, TracingObserver, Visitor,
};

/// Pipeline runner: selects components, walks them and collects a `RunReport`.
///
/// A `Pipes` owns its registry. Register scripts and tasks first, then call
/// [`Pipes::run`] as often as needed; every run gets its own queue and walker and
/// loads components afresh.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use the_pipes::backends::workspace::YamlWorkspace;
/// # use the_pipes::engine::Pipes;
/// # async fn demo() -> anyhow::Result<()> {
/// let workspace = Arc::new(YamlWorkspace::load("workspace.yaml")?);
/// let mut pipes = Pipes::new(workspace.clone(), workspace);
/// pipes.register_script("compiler", "default", "scripts/compile.sh");
///
/// let report = pipes.run("build", &[], None).await?;
/// println!("{}", serde_json::to_string_pretty(&report)?);
/// # Ok(())
/// # }
/// ```
pub struct Pipes {
    source: Arc<dyn ComponentSource>,
    graphs: Arc<dyn GraphProvider>,
    registry: Arc<Registry>,
    observer: Arc<dyn OutputObserver>,
    defaults: RunOptions,
}

impl Pipes {
    pub fn new(source: Arc<dyn ComponentSource>, graphs: Arc<dyn GraphProvider>) -> Self {
        Self {
            source,
            graphs,
            registry: Arc::new(Registry::new()),
            observer: Arc::new(TracingObserver),
            defaults: RunOptions::default(),
        }
    }

    /// Receive shell-command stdout somewhere other than the log.
    pub fn with_observer(mut self, observer: Arc<dyn OutputObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Options applied to every field a run leaves unset.
    pub fn with_default_options(mut self, defaults: RunOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Fails with `InvalidTaskName` when `name` is not `extension[:task]`.
    pub fn register_task(&mut self, name: &str, handler: Arc<dyn Task>) -> Result<&mut Self, PipelineError> {
        Arc::make_mut(&mut self.registry).register_task(name, handler)?;
        Ok(self)
    }

    pub fn register_script(&mut self, extension: &str, task: &str, path: impl Into<PathBuf>) -> &mut Self {
        Arc::make_mut(&mut self.registry).register_script(extension, task, path);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Ids to build: the explicit selection when given, otherwise every modified
    /// component followed by every new one, without duplicates.
    pub async fn components_for_build(&self, ids: &[String]) -> Result<Vec<String>, PipelineError> {
        if !ids.is_empty() {
            return Ok(self.source.get_many(ids).await?);
        }

        let mut selected = self.source.modified().await?;
        selected.extend(self.source.new_components().await?);

        let mut seen = HashSet::new();
        selected.retain(|id| seen.insert(id.clone()));
        Ok(selected)
    }

    /// Run `pipeline` for `ids` (or the changed components when empty).
    pub async fn run(
        &self,
        pipeline: &str,
        ids: &[String],
        options: Option<RunOptions>,
    ) -> Result<RunReport, PipelineError> {
        self.run_with_cancellation(pipeline, ids, options, CancellationToken::new())
            .await
    }

    /// Like [`Pipes::run`], stopping early once `cancel` fires.
    ///
    /// A cancelled run still returns a report: work that never started is
    /// `Skipped` and `RunReport::cancelled` is set.
    pub async fn run_with_cancellation(
        &self,
        pipeline: &str,
        ids: &[String],
        options: Option<RunOptions>,
        cancel: CancellationToken,
    ) -> Result<RunReport, PipelineError> {
        let options = options.unwrap_or_default().or(self.defaults);
        let result = self.execute(pipeline, ids, &options, &cancel).await;
        if let Err(e) = &result {
            RunFailed { pipeline, error: e }.log();
        }
        result
    }

    async fn execute(
        &self,
        pipeline: &str,
        ids: &[String],
        options: &RunOptions,
        cancel: &CancellationToken,
    ) -> Result<RunReport, PipelineError> {
        let start = Instant::now();

        let selected = self.components_for_build(ids).await?;
        let components: Vec<Arc<Component>> = self
            .source
            .load(&selected)
            .await?
            .into_iter()
            .map(Arc::new)
            .collect();
        let order: Vec<String> = components.iter().map(|c| c.id().to_string()).collect();

        let mut walker = WalkerFactory::from_options(options, components, self.graphs.as_ref()).await?;
        RunStarted {
            pipeline,
            component_count: order.len(),
            parallelism: options.parallelism(),
            walker: walker.name(),
        }
        .log();

        let queue = ConcurrencyQueue::new(options.parallelism());
        let mut statuses = walker
            .walk(self.visitor(pipeline, cancel), &queue, cancel)
            .await?;

        let mut report = RunReport::new(pipeline);
        for id in order {
            let status = statuses
                .remove(&id)
                .unwrap_or_else(|| ComponentStatus::Skipped(NOT_SCHEDULED_REASON.to_string()));
            report.push(id, status);
        }
        report.cancelled = cancel.is_cancelled();
        report.set_duration(start.elapsed());

        if report.cancelled {
            RunCancelled {
                pipeline,
                pending: report.summary().skipped,
            }
            .log();
        } else {
            RunCompleted {
                pipeline,
                summary: report.summary(),
                duration: start.elapsed(),
            }
            .log();
        }
        Ok(report)
    }

    fn visitor(&self, pipeline: &str, cancel: &CancellationToken) -> Visitor {
        let executor = StepExecutor::new(self.registry.clone(), self.observer.clone());
        let pipeline = pipeline.to_string();
        let cancel = cancel.clone();
        Arc::new(move |component: Arc<Component>| -> BoxFuture<ComponentStatus> {
            let executor = executor.clone();
            let pipeline = pipeline.clone();
            let cancel = cancel.clone();
            Box::pin(async move { executor.visit(component, &pipeline, &cancel).await })
        })
    }
}
