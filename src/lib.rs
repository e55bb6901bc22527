// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // workspace + local sandbox collaborators
pub mod component;     // loaded component + pipeline config
pub mod config;        // manifest, options, dependency graph
pub mod engine;        // queue, registry, resolver, walkers, runner
pub mod errors;        // error handling
pub mod observability; // structured log messages
pub mod traits;        // collaborator and walker abstractions

pub use component::{Component, ComponentConfig};
pub use config::RunOptions;
pub use engine::{ComponentStatus, Pipes, Registry, RunReport};
pub use errors::PipelineError;
