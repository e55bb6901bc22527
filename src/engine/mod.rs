// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod array;
pub mod factory;
pub mod queue;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod runner;
pub mod step_executor;
pub mod topological;

pub use array::ArrayWalker;
pub use factory::WalkerFactory;
pub use queue::{ConcurrencyQueue, QueueTicket};
pub use registry::Registry;
pub use report::{ComponentReport, ComponentStatus, RunReport, RunSummary};
pub use resolver::{ResolvedStep, StepRef, StepResolver};
pub use runner::Pipes;
pub use step_executor::StepExecutor;
pub use topological::TopologicalWalker;
