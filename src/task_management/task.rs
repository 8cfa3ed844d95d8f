//! # Task System Core Trait
//!
//! A `Task` is the whole workload of one worker thread. It owns its inputs, runs
//! to completion on its thread, and reports one outcome per unit of work over
//! the channel it is handed.
//!
//! ## Task Lifecycle
//! 1. Tasks are handed to `WorkerPool::spawn`, one thread per task
//! 2. `process()` runs on the worker thread
//! 3. Outcomes are sent as they are produced and drained by the coordinator
//!    with `WorkerPool::drain_outcomes()`
//! 4. The thread exits when `process()` returns
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be moved onto its thread
//! - Outcomes must be `Send` to travel back to the coordinating thread
//! - Tasks should own their inputs instead of sharing them

use std::sync::atomic::AtomicBool;
use std::sync::mpsc::Sender;

/// A unit of work executed on its own worker thread.
pub trait Task: Send + 'static {
    /// Per-item report sent back to the coordinator.
    type Outcome: Send + 'static;

    /// Runs the task to completion.
    ///
    /// # Implementation Notes
    /// - Check `cancel` between items; once it is set, return without starting
    ///   further work
    /// - Send one outcome per processed item; a closed channel means nobody is
    ///   listening any more and is not an error
    fn process(self, cancel: &AtomicBool, outcomes: &Sender<Self::Outcome>);
}
