// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::config::consts::DEFAULT_PARALLELISM;

/// Options for a single pipeline run.
///
/// Every field is optional and defaults are applied per field, so a caller that
/// only sets `topological_sort` still gets the default parallelism.
///
/// # Example
/// ```yaml
/// options:
///   parallelism: 2
///   topological_sort: false
/// ```
///
/// ```
/// use the_pipes::config::RunOptions;
///
/// let options = RunOptions::default().with_topological_sort(false);
/// assert_eq!(options.parallelism(), 4);
/// assert!(!options.topological_sort());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    #[serde(default, alias = "max_concurrency")]
    pub parallelism: Option<usize>,
    #[serde(default, alias = "topologicalSort")]
    pub topological_sort: Option<bool>,
}

impl RunOptions {
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    pub fn with_topological_sort(mut self, topological_sort: bool) -> Self {
        self.topological_sort = Some(topological_sort);
        self
    }

    /// Effective parallelism; zero or missing falls back to the default.
    pub fn parallelism(&self) -> usize {
        self.parallelism
            .filter(|p| *p > 0)
            .unwrap_or(DEFAULT_PARALLELISM)
    }

    /// Whether components are walked in dependency order (default `true`).
    pub fn topological_sort(&self) -> bool {
        self.topological_sort.unwrap_or(true)
    }

    /// Fill every unset field from `fallback`.
    pub fn or(self, fallback: RunOptions) -> RunOptions {
        RunOptions {
            parallelism: self
                .parallelism
                .filter(|p| *p > 0)
                .or(fallback.parallelism),
            topological_sort: self.topological_sort.or(fallback.topological_sort),
        }
    }
}
