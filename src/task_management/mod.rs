//! # Task Management System
//!
//! A fixed pool of OS worker threads for CPU-bound generation work.
//!
//! ## Architecture Overview
//! - `WorkerPool`: spawns one thread per task, tracks liveness and collects outcomes
//! - `Task`: the workload of one thread
//! - `resolve_worker_count`: bounds the requested thread count by the machine
//!
//! ## Lifecycle
//! 1. The coordinator partitions its work into tasks and calls `WorkerPool::spawn()`
//! 2. Each worker runs its task and streams outcomes back over an MPSC channel
//! 3. Once per tick the coordinator calls `drain_outcomes()` and `all_finished()`;
//!    neither call blocks
//! 4. Dropping the pool raises the cancellation flag and joins every thread,
//!    so no worker outlives the buffers it writes to
//!
//! ## Example Usage
//! ```rust,ignore
//! let mut pool = WorkerPool::spawn(tasks);
//!
//! // In your main loop:
//! for outcome in pool.drain_outcomes() {
//!     handle(outcome);
//! }
//! if pool.all_finished() {
//!     pool.join();
//! }
//! ```

pub mod task;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
pub use task::Task;

/// Number of worker threads to use for a request.
///
/// One logical processor is left to the coordinating thread, and there is
/// always at least one worker.
pub fn resolve_worker_count(requested: usize) -> usize {
    let available = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    requested.min(available.saturating_sub(1)).max(1)
}

/// A single worker thread.
#[derive(Debug)]
struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

/// A pool of worker threads, each running one task to completion.
///
/// # Implementation Notes
/// - Liveness is polled with `JoinHandle::is_finished`, never by blocking
/// - Drop-safe: cancels outstanding work and joins every thread
/// - Panic-safe: a panicking worker is reported when joined, not propagated
pub struct WorkerPool<O: Send + 'static> {
    workers: Vec<Worker>,
    cancel: Arc<AtomicBool>,
    outcome_receiver: Receiver<O>,
}

impl<O: Send + 'static> WorkerPool<O> {
    /// Starts one worker thread per task.
    ///
    /// # Panics
    /// Panics if the operating system refuses to create a thread.
    pub fn spawn<T>(tasks: Vec<T>) -> Self
    where
        T: Task<Outcome = O>,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let (outcome_sender, outcome_receiver) = channel::<O>();

        info!(
            "Starting {} workers (available parallelism: {:?})",
            tasks.len(),
            thread::available_parallelism()
        );

        let workers = tasks
            .into_iter()
            .enumerate()
            .map(|(id, task)| {
                let cancel = cancel.clone();
                let outcome_sender = outcome_sender.clone();
                let handle = thread::Builder::new()
                    .name(format!("worldgen-worker-{id}"))
                    .spawn(move || task.process(&cancel, &outcome_sender))
                    .expect("failed to spawn worker thread");
                Worker {
                    id,
                    handle: Some(handle),
                }
            })
            .collect();

        WorkerPool {
            workers,
            cancel,
            outcome_receiver,
        }
    }

    /// Number of threads started by [`WorkerPool::spawn`].
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Whether every worker thread has exited. Never blocks.
    pub fn all_finished(&self) -> bool {
        self.workers.iter().all(|worker| {
            worker
                .handle
                .as_ref()
                .map_or(true, |handle| handle.is_finished())
        })
    }

    /// Collects every outcome reported since the last call. Never blocks.
    pub fn drain_outcomes(&self) -> Vec<O> {
        self.outcome_receiver.try_iter().collect()
    }

    /// Asks workers to stop before their next item.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Whether [`WorkerPool::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Waits for every worker thread to exit.
    ///
    /// # Returns
    /// The number of workers that panicked.
    pub fn join(&mut self) -> usize {
        let mut panicked = 0;
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                if handle.join().is_err() {
                    warn!("Worker {} panicked", worker.id);
                    panicked += 1;
                } else {
                    debug!("Worker {} joined", worker.id);
                }
            }
        }
        panicked
    }
}

impl<O: Send + 'static> Drop for WorkerPool<O> {
    fn drop(&mut self) {
        if !self.all_finished() {
            info!("Cancelling workers still running at teardown");
            self.cancel();
        }
        self.join();
    }
}
