// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Collaborator implementations for the pipeline core.
//!
//! The core only sees the `ComponentSource`, `GraphProvider` and `Sandbox`
//! traits. This module supplies a concrete, replaceable implementation of each.
//!
//! # Available Backends
//!
//! ## Workspace
//! `YamlWorkspace` reads a YAML manifest listing components, their change
//! state, dependencies and pipelines. It is both the component source and the
//! graph provider.
//!
//! ## Sandbox
//! `LocalSandbox` runs scripts and commands as child processes in the
//! component's directory, streaming stdout and killing children on
//! cancellation.
//!
//! ## Stub (Test-Only)
//! In-memory workspace and recording sandbox used by engine tests:
//! - **StubSandbox**: records step start/finish without spawning anything
//! - **StubWorkspace**: builder-style component source and graph provider
//! - **Journal**: shared event log with peak-concurrency tracking
//! - **Note**: NOT available in production builds
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use the_pipes::backends::workspace::YamlWorkspace;
//! use the_pipes::engine::Pipes;
//!
//! let workspace = Arc::new(YamlWorkspace::load("workspace.yaml")?);
//! let pipes = Pipes::new(workspace.clone(), workspace.clone())
//!     .with_default_options(workspace.default_options());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod sandbox;
#[cfg(test)]
pub mod stub;
pub mod workspace;

pub use sandbox::LocalSandbox;
pub use workspace::YamlWorkspace;
