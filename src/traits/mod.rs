// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod observer;
pub mod sandbox;
pub mod source;
pub mod task;
pub mod walker;

pub use observer::{OutputObserver, TracingObserver};
pub use sandbox::{ExecHandle, ExitInfo, Sandbox};
pub use source::{ComponentSource, GraphProvider};
pub use task::{Task, TaskContext};
pub use walker::{BoxFuture, Visitor, WalkReport, Walker};
