// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::process::ExitStatus;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::errors::SandboxError;

/// How a sandboxed invocation terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitInfo {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ExitInfo {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ExitInfo {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// A running child process.
///
/// `stdout` yields chunks as the process writes them and closes once the stream
/// ends; `completion` resolves when the process terminates.
pub struct ExecHandle {
    pub stdout: mpsc::Receiver<Vec<u8>>,
    pub completion: JoinHandle<Result<ExitInfo, SandboxError>>,
}

/// Isolated environment in which a component's scripts and commands run.
///
/// Implementations must terminate in-flight processes once `cancel` fires.
#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Run a registered script to completion.
    async fn run(&self, script: &Path, cancel: CancellationToken) -> Result<ExitInfo, SandboxError>;

    /// Start `argv` as a child process.
    async fn exec(&self, argv: &[String], cancel: CancellationToken) -> Result<ExecHandle, SandboxError>;
}
