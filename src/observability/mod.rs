// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Diagnostic and operational log lines are defined as message structs under
//! [`messages`], each implementing `Display` for the human-readable text and
//! [`messages::StructuredLog`] to emit the event with structured fields. Call
//! sites never format log strings themselves.
//!
//! # Usage
//!
//! ```rust
//! use the_pipes::observability::messages::StructuredLog;
//! use the_pipes::observability::messages::step::StepFailed;
//!
//! StepFailed {
//!     component_id: "utils/strings",
//!     step: "compiler:release",
//!     reason: "exit code 2",
//! }
//! .log();
//! ```
//!
//! Child-process output goes through [`crate::traits::OutputObserver`]; the
//! default observer forwards it to `tracing` as well.

pub mod messages;
