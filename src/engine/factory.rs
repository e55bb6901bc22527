// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::component::Component;
use crate::config::RunOptions;
use crate::engine::array::ArrayWalker;
use crate::engine::topological::TopologicalWalker;
use crate::errors::PipelineError;
use crate::traits::{GraphProvider, Walker};

/// Factory for creating walkers from run options
pub struct WalkerFactory;

impl WalkerFactory {
    /// Create a walker for `components` based on `options.topological_sort()`.
    ///
    /// The dependency graph is only built when it is actually needed.
    pub async fn from_options(
        options: &RunOptions,
        components: Vec<Arc<Component>>,
        graphs: &dyn GraphProvider,
    ) -> Result<Box<dyn Walker>, PipelineError> {
        if options.topological_sort() {
            let ids: Vec<String> = components.iter().map(|c| c.id().to_string()).collect();
            let graph = graphs.build(&ids).await?;
            Ok(Box::new(TopologicalWalker::new(graph, components)))
        } else {
            Ok(Box::new(ArrayWalker::new(components)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{Journal, StubWorkspace};
    use crate::traits::ComponentSource;

    #[tokio::test]
    async fn test_walker_follows_topological_flag() {
        let workspace = StubWorkspace::new(Journal::new())
            .component("core", &[], vec![])
            .component("app", &["core"], vec![]);
        let ids = vec!["core".to_string(), "app".to_string()];

        let load = || async {
            workspace
                .load(&ids)
                .await
                .unwrap()
                .into_iter()
                .map(Arc::new)
                .collect::<Vec<_>>()
        };

        let walker = WalkerFactory::from_options(&RunOptions::default(), load().await, &workspace)
            .await
            .unwrap();
        assert_eq!(walker.name(), "topological");

        let options = RunOptions::default().with_topological_sort(false);
        let walker = WalkerFactory::from_options(&options, load().await, &workspace)
            .await
            .unwrap();
        assert_eq!(walker.name(), "array");
    }
}
