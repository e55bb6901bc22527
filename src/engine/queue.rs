// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded-parallelism admission queue.
//!
//! Units of work are admitted strictly in submission order and at most
//! `parallelism` of them are active at any instant. A single dispatcher task owns
//! the semaphore: it takes the next unit off the channel, waits for a permit and
//! only then spawns the unit, so admission is FIFO regardless of how the runtime
//! schedules spawned tasks. One queue is shared by every layer of a run, which
//! keeps the bound global rather than per layer.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

use crate::config::consts::DEFAULT_PARALLELISM;
use crate::errors::PipelineError;

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Releases the permit and the active count together, even if the unit panics.
struct ActiveGuard {
    active: Arc<AtomicUsize>,
    _permit: OwnedSemaphorePermit,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// FIFO queue admitting at most `parallelism` concurrent units.
///
/// Must be created inside a tokio runtime.
///
/// # Example
/// ```
/// use the_pipes::engine::ConcurrencyQueue;
///
/// # #[tokio::main]
/// # async fn main() {
/// let queue = ConcurrencyQueue::new(2);
/// let tickets: Vec<_> = (0..4).map(|i| queue.add(async move { i * 10 })).collect();
///
/// let mut results = Vec::new();
/// for ticket in tickets {
///     results.push(ticket.wait().await.unwrap());
/// }
/// assert_eq!(results, vec![0, 10, 20, 30]);
/// # }
/// ```
pub struct ConcurrencyQueue {
    parallelism: usize,
    sender: mpsc::UnboundedSender<Job>,
    active: Arc<AtomicUsize>,
    dispatcher: JoinHandle<()>,
}

/// Handle to the result of a queued unit.
pub struct QueueTicket<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T> QueueTicket<T> {
    /// Wait for the unit to finish.
    ///
    /// Fails when the unit panicked or was dropped before it could run.
    pub async fn wait(self) -> Result<T, PipelineError> {
        self.receiver
            .await
            .map_err(|_| PipelineError::InternalError {
                message: "queued unit was dropped before completing".into(),
            })
    }
}

impl ConcurrencyQueue {
    /// Create a queue; a zero `parallelism` falls back to the default of 4.
    pub fn new(parallelism: usize) -> Self {
        let parallelism = if parallelism == 0 {
            DEFAULT_PARALLELISM
        } else {
            parallelism
        };

        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let semaphore = Arc::new(Semaphore::new(parallelism));
        let active = Arc::new(AtomicUsize::new(0));

        let dispatcher = {
            let active = active.clone();
            tokio::spawn(async move {
                while let Some(job) = receiver.recv().await {
                    let permit = match semaphore.clone().acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => break,
                    };
                    active.fetch_add(1, Ordering::SeqCst);
                    let guard = ActiveGuard {
                        active: active.clone(),
                        _permit: permit,
                    };
                    tokio::spawn(async move {
                        let _guard = guard;
                        job.await;
                    });
                }
            })
        };

        Self {
            parallelism,
            sender,
            active,
            dispatcher,
        }
    }

    /// Submit a unit of work. It starts once every earlier unit has been admitted
    /// and a slot is free.
    pub fn add<F, T>(&self, unit: F) -> QueueTicket<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let _ = tx.send(unit.await);
        });
        if self.sender.send(job).is_err() {
            tracing::warn!("concurrency queue dispatcher has stopped; unit dropped");
        }
        QueueTicket { receiver: rx }
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Number of units currently running.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for ConcurrencyQueue {
    fn drop(&mut self) {
        self.dispatcher.abort();
    }
}
