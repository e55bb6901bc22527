// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Number of components allowed to run at once when the caller gives no positive value
pub const DEFAULT_PARALLELISM: usize = 4;
/// Task name used when a step token omits the `:<task>` suffix
pub const DEFAULT_TASK: &str = "default";
/// Extension key under which components declare their pipelines
pub const PIPES_EXTENSION: &str = "pipes";
/// Skip reason for components without a usable pipeline entry
pub const NO_PIPELINE_REASON: &str = "no pipeline defined";
/// Reason recorded for work that never started because the run was cancelled
pub const CANCELLED_REASON: &str = "run cancelled";
/// Reason recorded for a loaded component the walker never reported on
pub const NOT_SCHEDULED_REASON: &str = "not scheduled";
