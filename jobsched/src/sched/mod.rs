//! The scheduling contract and its two coordinator disciplines.
//!
//! Two implementations satisfy [`Scheduler`]: [`locking::LockingScheduler`]
//! keeps the heap behind one mutex shared with a background waiter task;
//! [`channel::ChannelScheduler`] gives the heap to a single owning task and
//! feeds it over channels. Both share the arm/drain decisions in `core`.

pub mod channel;
pub(crate) mod core;
pub mod locking;

use async_trait::async_trait;

use crate::errors::SchedError;

/// A submitted unit of work. Runs exactly once, on a spawned task that is
/// never the submitter's own.
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// Deferred-execution scheduler: work submitted with a delay runs no
/// earlier than `now + delay`.
///
/// Ordering is partial: within one drain pass, jobs due before an instant
/// dispatch before jobs due strictly after it. Jobs with equal due times
/// dispatch in the order the coordinator accepted them (a monotonic
/// sequence number breaks the tie); that is not a FIFO guarantee across
/// drain passes.
#[async_trait]
pub trait Scheduler: Send {
    /// Bring up the coordinating task. Must precede any [`schedule`] call.
    ///
    /// [`schedule`]: Scheduler::schedule
    fn start(&mut self) -> Result<(), SchedError>;

    /// Submit `work` to run no earlier than `delay_ms` milliseconds from
    /// now. The channel discipline may park the caller briefly until the
    /// owning task accepts the handoff.
    async fn schedule(&self, work: Work, delay_ms: u64) -> Result<(), SchedError>;

    /// Cancel the pending wakeup and halt the coordinating task. Jobs still
    /// in the heap are discarded, never dispatched. Calling `stop` twice is
    /// an error.
    async fn stop(&mut self) -> Result<(), SchedError>;
}

/// Concurrency discipline, picked at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    /// Shared heap behind one mutex, background waiter task.
    Locking,
    /// Single owning task, channel handoff, no locks.
    Channel,
}

pub fn new_scheduler(discipline: Discipline) -> Box<dyn Scheduler> {
    match discipline {
        Discipline::Locking => Box::new(locking::LockingScheduler::new()),
        Discipline::Channel => Box::new(channel::ChannelScheduler::new()),
    }
}
