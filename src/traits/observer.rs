// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

/// Receives child-process output as it is produced.
pub trait OutputObserver: Send + Sync {
    fn on_stdout(&self, component_id: &str, chunk: &[u8]);
}

/// Forwards every chunk to `tracing` at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl OutputObserver for TracingObserver {
    fn on_stdout(&self, component_id: &str, chunk: &[u8]) {
        let text = String::from_utf8_lossy(chunk);
        for line in text.lines().filter(|l| !l.is_empty()) {
            tracing::info!(component_id, "{}", line);
        }
    }
}

impl<T: OutputObserver + ?Sized> OutputObserver for Arc<T> {
    fn on_stdout(&self, component_id: &str, chunk: &[u8]) {
        (**self).on_stdout(component_id, chunk)
    }
}
