//! Decision logic shared by both coordinator disciplines: job ordering,
//! when to replace the armed wakeup, and how to drain everything due.

use std::cmp::Ordering;
use std::fmt;

use tokio::time::{Duration, Instant};
use tracing::{debug, trace};

use super::Work;
use crate::errors::SchedError;
use crate::heap::MinHeap;

/// A callback paired with the instant it becomes due. `seq` is stamped by
/// the coordinator when it accepts the job and breaks ties between equal
/// due times; `requested_delay` is diagnostic only.
pub(crate) struct Job {
    pub(crate) due: Instant,
    pub(crate) seq: u64,
    pub(crate) requested_delay: Duration,
    pub(crate) work: Work,
}

impl Job {
    pub(crate) fn new(work: Work, delay: Duration) -> Self {
        Self {
            due: Instant::now() + delay,
            seq: 0,
            requested_delay: delay,
            work,
        }
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Job {}

impl PartialOrd for Job {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Job {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due.cmp(&other.due).then(self.seq.cmp(&other.seq))
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("due", &self.due)
            .field("seq", &self.seq)
            .field("requested_delay", &self.requested_delay)
            .finish_non_exhaustive()
    }
}

/// Coordinator phase, for diagnostics and transition logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Idle,
    Armed,
    Draining,
}

/// Handle-side lifecycle. `Stopped` is terminal; start/schedule/stop out of
/// order are deterministic errors, not undefined behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    New,
    Running,
    Stopped,
}

impl Lifecycle {
    /// The error a call requiring `Running` gets in this state, if any.
    pub(crate) fn require_running(self) -> Result<(), SchedError> {
        match self {
            Lifecycle::New => Err(SchedError::NotStarted),
            Lifecycle::Stopped => Err(SchedError::AlreadyStopped),
            Lifecycle::Running => Ok(()),
        }
    }
}

/// Whether the pending wakeup must be replaced: yes when nothing is armed,
/// or when the heap root now sits strictly earlier than the armed deadline.
/// An equal-or-earlier armed deadline already covers the root.
pub(crate) fn should_rearm(armed: Option<Instant>, root_due: Instant) -> bool {
    match armed {
        None => true,
        Some(deadline) => root_due < deadline,
    }
}

/// Insert an accepted job and apply the rearm decision against `armed`.
/// Returns true when the wakeup deadline changed, so the caller can poke
/// its waiter. Must run inside whatever serializes heap access: the lock
/// for the locking discipline, the owning task for the channel one.
pub(crate) fn insert_and_rearm(
    heap: &mut MinHeap<Job>,
    armed: &mut Option<Instant>,
    job: Job,
) -> bool {
    trace!(seq = job.seq, due = ?job.due, delay = ?job.requested_delay, "job accepted");
    heap.insert(job);
    let Ok(root) = heap.peek() else {
        return false;
    };
    if should_rearm(*armed, root.due) {
        debug!(wakeup = ?root.due, pending = heap.len(), "rearming for earlier deadline");
        *armed = Some(root.due);
        true
    } else {
        false
    }
}

/// Pop the root if it is due at `now`.
pub(crate) fn pop_due(heap: &mut MinHeap<Job>, now: Instant) -> Option<Job> {
    if heap.peek().is_ok_and(|job| job.due <= now) {
        heap.extract_min().ok()
    } else {
        None
    }
}

/// Hand a job's work to its own task. Never runs the closure inline: a slow
/// or panicking callback must not touch the coordinator or the heap.
pub(crate) fn dispatch(job: Job) {
    trace!(seq = job.seq, overshoot = ?job.due.elapsed(), "dispatching job");
    let work = job.work;
    tokio::spawn(async move {
        work();
    });
}

/// Drain pass for an exclusively-owned heap: one `now`, then extract and
/// dispatch while the root is due. Wakeups do not land exactly on each
/// job's instant, so slop accumulates and a single fire may owe several
/// jobs. Yields between dispatches the way the original coordinator did.
pub(crate) async fn drain_due(heap: &mut MinHeap<Job>, now: Instant) -> usize {
    let mut dispatched = 0;
    while let Some(job) = pop_due(heap, now) {
        dispatch(job);
        dispatched += 1;
        tokio::task::yield_now().await;
    }
    dispatched
}
