// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sandbox that runs scripts and commands as local child processes.
//!
//! Each component gets its own `LocalSandbox` rooted at the component's
//! directory. Every child leads its own process group. On cancellation the
//! whole group is killed, so processes started by a script or command go with
//! it. Dropping a handle kills the direct child only.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::errors::SandboxError;
use crate::traits::{ExecHandle, ExitInfo, Sandbox};

const STDOUT_CHUNK_SIZE: usize = 8192;
const STDOUT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct LocalSandbox {
    dir: PathBuf,
    shell: String,
}

impl LocalSandbox {
    /// Sandbox running everything with `dir` as the working directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            shell: "sh".to_string(),
        }
    }

    /// Interpreter used for registered scripts (default `sh`).
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Start `command` as the leader of a new process group.
fn spawn_group(command: &mut Command) -> std::io::Result<Child> {
    #[cfg(unix)]
    command.process_group(0);
    command.kill_on_drop(true).spawn()
}

/// Kill the child and everything in its process group, then reap the child.
async fn kill_group(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // The child leads its group, so the group id is its pid.
        unsafe {
            libc::killpg(pid as libc::pid_t, libc::SIGKILL);
        }
    }
    let _ = child.kill().await;
}

async fn forward_stdout(mut stdout: ChildStdout, tx: mpsc::Sender<Vec<u8>>) {
    let mut buf = vec![0u8; STDOUT_CHUNK_SIZE];
    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read child stdout");
                break;
            }
        }
    }
}

#[async_trait]
impl Sandbox for LocalSandbox {
    async fn run(&self, script: &Path, cancel: CancellationToken) -> Result<ExitInfo, SandboxError> {
        let mut command = Command::new(&self.shell);
        command.arg(script).current_dir(&self.dir).stdin(Stdio::null());
        let mut child = spawn_group(&mut command).map_err(|source| SandboxError::Spawn {
            program: script.display().to_string(),
            source,
        })?;

        tokio::select! {
            status = child.wait() => Ok(ExitInfo::from(status?)),
            _ = cancel.cancelled() => {
                kill_group(&mut child).await;
                Err(SandboxError::Cancelled)
            }
        }
    }

    async fn exec(&self, argv: &[String], cancel: CancellationToken) -> Result<ExecHandle, SandboxError> {
        let (program, args) = argv.split_first().ok_or(SandboxError::EmptyCommand)?;

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(&self.dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped());
        let mut child = spawn_group(&mut command).map_err(|source| SandboxError::Spawn {
            program: program.clone(),
            source,
        })?;

        let (tx, rx) = mpsc::channel(STDOUT_CHANNEL_CAPACITY);
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_stdout(stdout, tx));
        }

        let completion = tokio::spawn(async move {
            let status: Result<ExitInfo, SandboxError> = tokio::select! {
                status = child.wait() => status.map(ExitInfo::from).map_err(SandboxError::from),
                _ = cancel.cancelled() => {
                    kill_group(&mut child).await;
                    Err(SandboxError::Cancelled)
                }
            };
            status
        });

        Ok(ExecHandle {
            stdout: rx,
            completion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn argv(command: &str) -> Vec<String> {
        command.split_whitespace().map(str::to_owned).collect()
    }

    #[tokio::test]
    async fn test_run_script_in_component_dir() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("build.sh");
        std::fs::write(&script, "touch built.marker\n").unwrap();

        let sandbox = LocalSandbox::new(dir.path());
        let exit = sandbox.run(&script, CancellationToken::new()).await.unwrap();

        assert!(exit.is_success());
        assert!(dir.path().join("built.marker").exists());
    }

    #[tokio::test]
    async fn test_run_script_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fail.sh");
        std::fs::write(&script, "exit 3\n").unwrap();

        let exit = LocalSandbox::new(dir.path())
            .run(&script, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(exit, ExitInfo::from_code(3));
        assert_eq!(exit.to_string(), "exit code 3");
    }

    #[tokio::test]
    async fn test_exec_streams_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = LocalSandbox::new(dir.path());

        let mut handle = sandbox
            .exec(&argv("echo hello sandbox"), CancellationToken::new())
            .await
            .unwrap();

        let mut output = Vec::new();
        while let Some(chunk) = handle.stdout.recv().await {
            output.extend(chunk);
        }
        let exit = handle.completion.await.unwrap().unwrap();

        assert!(exit.is_success());
        assert_eq!(String::from_utf8(output).unwrap(), "hello sandbox\n");
    }

    #[tokio::test]
    async fn test_exec_non_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let handle = LocalSandbox::new(dir.path())
            .exec(&argv("false"), CancellationToken::new())
            .await
            .unwrap();

        let exit = handle.completion.await.unwrap().unwrap();
        assert!(!exit.is_success());
    }

    #[tokio::test]
    async fn test_exec_rejects_empty_and_unknown_programs() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = LocalSandbox::new(dir.path());

        assert!(matches!(
            sandbox.exec(&[], CancellationToken::new()).await,
            Err(SandboxError::EmptyCommand)
        ));
        assert!(matches!(
            sandbox
                .exec(&argv("definitely-not-a-real-program-xyz"), CancellationToken::new())
                .await,
            Err(SandboxError::Spawn { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancel_kills_child() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let handle = LocalSandbox::new(dir.path())
            .exec(&argv("sleep 30"), cancel.clone())
            .await
            .unwrap();

        cancel.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), handle.completion)
            .await
            .expect("child should be killed promptly")
            .unwrap();

        assert!(matches!(result, Err(SandboxError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_kills_background_children_of_a_command() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let command: Vec<String> = vec!["sh".into(), "-c".into(), "sleep 30 & sleep 30".into()];
        let mut handle = LocalSandbox::new(dir.path())
            .exec(&command, cancel.clone())
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        cancel.cancel();

        // The background sleep shares stdout; the channel only closes once it is dead too.
        tokio::time::timeout(Duration::from_secs(5), async {
            while handle.stdout.recv().await.is_some() {}
        })
        .await
        .expect("stdout should close once the process group is killed");
        let result = handle.completion.await.unwrap();
        assert!(matches!(result, Err(SandboxError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_kills_background_children_of_a_script() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("spawn.sh");
        std::fs::write(&script, "(sleep 1; touch late.marker) &\nwait\n").unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let result = LocalSandbox::new(dir.path()).run(&script, cancel).await;
        assert!(matches!(result, Err(SandboxError::Cancelled)));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!dir.path().join("late.marker").exists());
    }
}
