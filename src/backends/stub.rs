// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test doubles: a recording sandbox and an in-memory workspace.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::component::{Component, ComponentConfig};
use crate::config::{ComponentState, DependencyGraph};
use crate::errors::{SandboxError, WorkspaceError};
use crate::traits::{ComponentSource, ExecHandle, ExitInfo, GraphProvider, Sandbox};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Started,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub component: String,
    pub step: String,
    pub event: Event,
}

/// Shared, ordered log of every sandbox invocation across components.
#[derive(Default)]
pub struct Journal {
    entries: Mutex<Vec<JournalEntry>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl Journal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record(&self, component: &str, step: &str, event: Event) {
        match event {
            Event::Started => {
                let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
            }
            Event::Finished => {
                self.active.fetch_sub(1, Ordering::SeqCst);
            }
        }
        self.entries.lock().unwrap().push(JournalEntry {
            component: component.to_string(),
            step: step.to_string(),
            event,
        });
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Index of the first `event` recorded for `component`.
    pub fn position(&self, component: &str, event: Event) -> Option<usize> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .position(|e| e.component == component && e.event == event)
    }

    /// Index of the last `event` recorded for `component`.
    pub fn last_position(&self, component: &str, event: Event) -> Option<usize> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .rposition(|e| e.component == component && e.event == event)
    }

    pub fn invoked(&self, component: &str) -> bool {
        self.position(component, Event::Started).is_some()
    }

    /// Steps started for `component`, in order.
    pub fn steps(&self, component: &str) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.component == component && e.event == Event::Started)
            .map(|e| e.step.clone())
            .collect()
    }

    /// Most invocations observed running at the same time.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Sandbox that records invocations instead of spawning processes.
pub struct StubSandbox {
    component: String,
    journal: Arc<Journal>,
    delay: Duration,
    failing: HashSet<String>,
    output: Vec<Vec<u8>>,
}

impl StubSandbox {
    pub fn new(component: impl Into<String>, journal: Arc<Journal>) -> Self {
        Self {
            component: component.into(),
            journal,
            delay: Duration::ZERO,
            failing: HashSet::new(),
            output: Vec::new(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make the invocation named `step` (script path or joined argv) exit with 1.
    pub fn failing_on(mut self, step: impl Into<String>) -> Self {
        self.failing.insert(step.into());
        self
    }

    pub fn with_output(mut self, chunks: Vec<&str>) -> Self {
        self.output = chunks.into_iter().map(|c| c.as_bytes().to_vec()).collect();
        self
    }

    async fn invoke(&self, step: &str, cancel: &CancellationToken) -> Result<ExitInfo, SandboxError> {
        self.journal.record(&self.component, step, Event::Started);
        let cancelled = tokio::select! {
            _ = tokio::time::sleep(self.delay) => false,
            _ = cancel.cancelled() => true,
        };
        self.journal.record(&self.component, step, Event::Finished);

        if cancelled {
            Err(SandboxError::Cancelled)
        } else if self.failing.contains(step) {
            Ok(ExitInfo::from_code(1))
        } else {
            Ok(ExitInfo::success())
        }
    }
}

#[async_trait]
impl Sandbox for StubSandbox {
    async fn run(&self, script: &Path, cancel: CancellationToken) -> Result<ExitInfo, SandboxError> {
        self.invoke(&script.display().to_string(), &cancel).await
    }

    async fn exec(&self, argv: &[String], cancel: CancellationToken) -> Result<ExecHandle, SandboxError> {
        let exit = self.invoke(&argv.join(" "), &cancel).await;

        let (tx, rx) = mpsc::channel(self.output.len().max(1));
        for chunk in &self.output {
            let _ = tx.try_send(chunk.clone());
        }
        drop(tx);

        Ok(ExecHandle {
            stdout: rx,
            completion: tokio::spawn(async move { exit }),
        })
    }
}

struct StubEntry {
    id: String,
    state: ComponentState,
    depends_on: Vec<String>,
    config: ComponentConfig,
    failing: HashSet<String>,
}

/// In-memory component source and graph provider backed by `StubSandbox`es.
pub struct StubWorkspace {
    journal: Arc<Journal>,
    entries: Vec<StubEntry>,
    delay: Duration,
}

impl StubWorkspace {
    pub fn new(journal: Arc<Journal>) -> Self {
        Self {
            journal,
            entries: Vec::new(),
            delay: Duration::ZERO,
        }
    }

    /// Add a modified component with the given dependencies and pipelines.
    pub fn component(mut self, id: &str, depends_on: &[&str], pipelines: Vec<(&str, Vec<&str>)>) -> Self {
        let config = pipelines
            .into_iter()
            .fold(ComponentConfig::default(), |config, (name, steps)| {
                config.with_pipeline(name, steps)
            });
        self.entries.push(StubEntry {
            id: id.to_string(),
            state: ComponentState::Modified,
            depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
            config,
            failing: HashSet::new(),
        });
        self
    }

    pub fn with_config(mut self, id: &str, config: ComponentConfig) -> Self {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.config = config;
        }
        self
    }

    pub fn with_state(mut self, id: &str, state: ComponentState) -> Self {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.state = state;
        }
        self
    }

    pub fn failing(mut self, id: &str, step: &str) -> Self {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.failing.insert(step.to_string());
        }
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn entry(&self, id: &str) -> Result<&StubEntry, WorkspaceError> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| WorkspaceError::UnknownComponent(id.to_string()))
    }

    fn ids_in_state(&self, state: ComponentState) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.state == state)
            .map(|e| e.id.clone())
            .collect()
    }
}

#[async_trait]
impl ComponentSource for StubWorkspace {
    async fn get_many(&self, ids: &[String]) -> Result<Vec<String>, WorkspaceError> {
        ids.iter().map(|id| self.entry(id).map(|e| e.id.clone())).collect()
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
                let sandbox = entry.failing.iter().fold(
                    StubSandbox::new(id.clone(), self.journal.clone()).with_delay(self.delay),
                    |sandbox, step| sandbox.failing_on(step.clone()),
                );
                Ok(Component::new(id.clone(), entry.config.clone(), Box::new(sandbox)))
            })
            .collect()
    }
}

#[async_trait]
impl GraphProvider for StubWorkspace {
    async fn build(&self, ids: &[String]) -> Result<DependencyGraph, WorkspaceError> {
        let mut graph = DependencyGraph::new();
        for id in ids {
            let entry = self.entry(id)?;
            graph.add_node(id.clone());
            for dependency in entry.depends_on.iter().filter(|d| ids.contains(d)) {
                graph.add_dependency(dependency.clone(), id.clone());
            }
        }
        Ok(graph)
    }
}
