//! Lock-based coordinator: the heap, the armed deadline, and the phase tag
//! form one shared resource behind a single mutex. A background task waits
//! for the armed deadline and drains; submitters insert under the same
//! lock and poke the waiter when the root moved earlier.
//!
//! The insert and the rearm comparison always happen under one lock
//! acquisition, so a submitter and the draining task can never decide the
//! next wakeup independently. The lock is never held across an await, and
//! it is released around every dispatch, so a slow callback costs the heap
//! nothing beyond its own O(log n) extraction.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};
use tracing::{debug, info};

use super::core::{self, Job, Lifecycle, Phase};
use super::{Scheduler, Work};
use crate::errors::SchedError;
use crate::heap::MinHeap;

struct State {
    heap: MinHeap<Job>,
    armed: Option<Instant>,
    phase: Phase,
    next_seq: u64,
    running: bool,
}

pub struct LockingScheduler {
    state: Arc<Mutex<State>>,
    rearm: Arc<Notify>,
    shutdown: Arc<Notify>,
    task: Option<JoinHandle<()>>,
    lifecycle: Lifecycle,
}

impl Default for LockingScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl LockingScheduler {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                heap: MinHeap::new(),
                armed: None,
                phase: Phase::Idle,
                next_seq: 0,
                running: false,
            })),
            rearm: Arc::new(Notify::new()),
            shutdown: Arc::new(Notify::new()),
            task: None,
            lifecycle: Lifecycle::New,
        }
    }
}

#[async_trait]
impl Scheduler for LockingScheduler {
    fn start(&mut self) -> Result<(), SchedError> {
        match self.lifecycle {
            Lifecycle::Running => return Err(SchedError::AlreadyStarted),
            Lifecycle::Stopped => return Err(SchedError::AlreadyStopped),
            Lifecycle::New => {}
        }
        self.state.lock().running = true;
        self.task = Some(tokio::spawn(run_loop(
            self.state.clone(),
            self.rearm.clone(),
            self.shutdown.clone(),
        )));
        self.lifecycle = Lifecycle::Running;
        debug!("locking coordinator started");
        Ok(())
    }

    async fn schedule(&self, work: Work, delay_ms: u64) -> Result<(), SchedError> {
        self.lifecycle.require_running()?;
        let mut job = Job::new(work, Duration::from_millis(delay_ms));
        let rearmed = {
            let mut g = self.state.lock();
            if !g.running {
                return Err(SchedError::Shutdown);
            }
            let s = &mut *g;
            job.seq = s.next_seq;
            s.next_seq += 1;
            let rearmed = core::insert_and_rearm(&mut s.heap, &mut s.armed, job);
            if s.phase == Phase::Idle {
                s.phase = Phase::Armed;
            }
            rearmed
        };
        if rearmed {
            // waiter re-enters its select with the earlier deadline
            self.rearm.notify_one();
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), SchedError> {
        self.lifecycle.require_running()?;
        self.lifecycle = Lifecycle::Stopped;
        let discarded = {
            let mut g = self.state.lock();
            g.running = false;
            g.armed = None;
            let n = g.heap.len();
            g.heap = MinHeap::new();
            n
        };
        info!(discarded, "locking coordinator stopping");
        self.shutdown.notify_one();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        Ok(())
    }
}

impl Drop for LockingScheduler {
    fn drop(&mut self) {
        // handle dropped without stop(): tell the waiter to exit
        if self.task.is_some() {
            self.state.lock().running = false;
            self.shutdown.notify_one();
        }
    }
}

async fn run_loop(state: Arc<Mutex<State>>, rearm: Arc<Notify>, shutdown: Arc<Notify>) {
    loop {
        let deadline = {
            let g = state.lock();
            if !g.running {
                break;
            }
            g.armed
        };
        match deadline {
            None => {
                tokio::select! {
                    _ = rearm.notified() => continue,
                    _ = shutdown.notified() => break,
                }
            }
            Some(when) => {
                tokio::select! {
                    _ = time::sleep_until(when) => drain(&state).await,
                    // a submitter armed an earlier deadline; the pending
                    // sleep is dropped here, so a racing fire never lands
                    _ = rearm.notified() => continue,
                    _ = shutdown.notified() => break,
                }
            }
        }
    }
    debug!("locking coordinator exited");
}

/// One fire: take `now` once, then pop-and-dispatch every due job. The lock
/// is taken per extraction and released before the dispatch.
async fn drain(state: &Arc<Mutex<State>>) {
    let now = Instant::now();
    state.lock().phase = Phase::Draining;
    let mut dispatched = 0usize;
    loop {
        let job = {
            let mut g = state.lock();
            core::pop_due(&mut g.heap, now)
        };
        match job {
            Some(job) => {
                core::dispatch(job);
                dispatched += 1;
                tokio::task::yield_now().await;
            }
            None => break,
        }
    }
    let mut g = state.lock();
    g.armed = g.heap.peek().ok().map(|job| job.due);
    g.phase = if g.armed.is_some() { Phase::Armed } else { Phase::Idle };
    debug!(dispatched, phase = ?g.phase, next = ?g.armed, "drain complete");
}
