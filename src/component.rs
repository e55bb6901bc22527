// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::config::consts::PIPES_EXTENSION;
use crate::errors::PipelineError;
use crate::traits::Sandbox;

/// Per-component extension configuration.
///
/// Pipelines live under `extensions.pipes.<pipeline>` as an ordered list of step
/// tokens. Other extensions' configuration is carried along untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    #[serde(default)]
    pub extensions: HashMap<String, Value>,
}

impl ComponentConfig {
    /// Builder used mostly by tests and collaborators assembling configs by hand.
    pub fn with_pipeline<I, S>(mut self, pipeline: &str, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let steps: Vec<Value> = steps.into_iter().map(|s| Value::String(s.into())).collect();
        let pipes = self
            .extensions
            .entry(PIPES_EXTENSION.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !pipes.is_object() {
            *pipes = Value::Object(Map::new());
        }
        if let Value::Object(map) = pipes {
            map.insert(pipeline.to_string(), Value::Array(steps));
        }
        self
    }

    pub fn pipes(&self) -> Option<&Map<String, Value>> {
        self.extensions.get(PIPES_EXTENSION)?.as_object()
    }

    /// Steps of `pipeline`, or `None` when the entry is absent, not an array, or
    /// holds anything other than strings.
    pub fn pipeline(&self, pipeline: &str) -> Option<Vec<String>> {
        self.pipes()?
            .get(pipeline)?
            .as_array()?
            .iter()
            .map(|step| step.as_str().map(str::to_owned))
            .collect()
    }
}

/// A loaded component: id, configuration and its own execution sandbox.
pub struct Component {
    id: String,
    config: ComponentConfig,
    sandbox: Box<dyn Sandbox>,
}

impl Component {
    pub fn new(id: impl Into<String>, config: ComponentConfig, sandbox: Box<dyn Sandbox>) -> Self {
        Self {
            id: id.into(),
            config,
            sandbox,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &ComponentConfig {
        &self.config
    }

    pub fn sandbox(&self) -> &dyn Sandbox {
        self.sandbox.as_ref()
    }

    /// Steps for `pipeline`, failing with `ConfigurationMissing` when none are declared.
    pub fn require_pipeline(&self, pipeline: &str) -> Result<Vec<String>, PipelineError> {
        self.config
            .pipeline(pipeline)
            .ok_or_else(|| PipelineError::ConfigurationMissing {
                component_id: self.id.clone(),
                pipeline: pipeline.to_string(),
            })
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("pipelines", &self.config.pipes().map(|p| p.keys().collect::<Vec<_>>()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> ComponentConfig {
        serde_json::from_value(json!({ "extensions": value })).unwrap()
    }

    #[test]
    fn test_pipeline_lookup_table_driven() {
        let test_cases = vec![
            ("declared", json!({"pipes": {"build": ["a", "b:c"]}}), Some(vec!["a", "b:c"])),
            ("empty list", json!({"pipes": {"build": []}}), Some(vec![])),
            ("no pipes extension", json!({}), None),
            ("other pipeline only", json!({"pipes": {"test": ["x"]}}), None),
            ("not an array", json!({"pipes": {"build": "echo hi"}}), None),
            ("non-string step", json!({"pipes": {"build": ["a", 3]}}), None),
            ("pipes not an object", json!({"pipes": ["build"]}), None),
        ];

        for (name, extensions, expected) in test_cases {
            let expected: Option<Vec<String>> =
                expected.map(|steps| steps.into_iter().map(String::from).collect());
            assert_eq!(config(extensions).pipeline("build"), expected, "{}", name);
        }
    }

    #[test]
    fn test_with_pipeline_keeps_other_pipelines() {
        let config = ComponentConfig::default()
            .with_pipeline("build", ["echo build"])
            .with_pipeline("test", ["echo test"]);
        assert_eq!(config.pipeline("build"), Some(vec!["echo build".to_string()]));
        assert_eq!(config.pipeline("test"), Some(vec!["echo test".to_string()]));
    }
}
