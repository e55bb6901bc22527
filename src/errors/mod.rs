// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod pipeline;
mod sandbox;
mod workspace;

pub use pipeline::PipelineError;
pub use sandbox::SandboxError;
pub use workspace::{ValidationError, WorkspaceError};
