// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Failures reported by an execution sandbox.
#[derive(Error, Debug)]
pub enum SandboxError {
    /// The program could not be started at all.
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A command with no program name was submitted.
    #[error("Cannot execute an empty command")]
    EmptyCommand,

    /// The invocation was terminated because the run was cancelled.
    #[error("Invocation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
