//! Channel-based coordinator: one task owns the heap outright, so no lock
//! exists anywhere. Submissions arrive over a capacity-1 channel (the
//! submitter parks until the owner takes the job), shutdown over a second
//! channel, and the owning loop multiplexes {wakeup, submission, shutdown}
//! with whichever fires first.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};
use tracing::{debug, info};

use super::core::{self, Job, Lifecycle, Phase};
use super::{Scheduler, Work};
use crate::errors::SchedError;
use crate::heap::MinHeap;

pub struct ChannelScheduler {
    submit_tx: Option<mpsc::Sender<Job>>,
    done_tx: Option<mpsc::Sender<()>>,
    task: Option<JoinHandle<()>>,
    lifecycle: Lifecycle,
}

impl Default for ChannelScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelScheduler {
    pub fn new() -> Self {
        Self {
            submit_tx: None,
            done_tx: None,
            task: None,
            lifecycle: Lifecycle::New,
        }
    }
}

#[async_trait]
impl Scheduler for ChannelScheduler {
    fn start(&mut self) -> Result<(), SchedError> {
        match self.lifecycle {
            Lifecycle::Running => return Err(SchedError::AlreadyStarted),
            Lifecycle::Stopped => return Err(SchedError::AlreadyStopped),
            Lifecycle::New => {}
        }
        let (submit_tx, submit_rx) = mpsc::channel::<Job>(1);
        let (done_tx, done_rx) = mpsc::channel::<()>(1);
        self.task = Some(tokio::spawn(run_loop(submit_rx, done_rx)));
        self.submit_tx = Some(submit_tx);
        self.done_tx = Some(done_tx);
        self.lifecycle = Lifecycle::Running;
        debug!("channel coordinator started");
        Ok(())
    }

    async fn schedule(&self, work: Work, delay_ms: u64) -> Result<(), SchedError> {
        self.lifecycle.require_running()?;
        let Some(tx) = self.submit_tx.as_ref() else {
            return Err(SchedError::Shutdown);
        };
        let job = Job::new(work, Duration::from_millis(delay_ms));
        // parks until the owning task accepts the handoff
        tx.send(job).await.map_err(|_| SchedError::Shutdown)
    }

    async fn stop(&mut self) -> Result<(), SchedError> {
        self.lifecycle.require_running()?;
        self.lifecycle = Lifecycle::Stopped;
        self.submit_tx = None;
        if let Some(done_tx) = self.done_tx.take() {
            let _ = done_tx.send(()).await;
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        info!("channel coordinator stopped");
        Ok(())
    }
}

/// The owning loop. Heap, armed deadline and phase live on this task's
/// stack and nowhere else; every mutation is serialized by channel
/// delivery order.
async fn run_loop(mut submit_rx: mpsc::Receiver<Job>, mut done_rx: mpsc::Receiver<()>) {
    let mut heap: MinHeap<Job> = MinHeap::new();
    let mut armed: Option<Instant> = None;
    let mut phase = Phase::Idle;
    let mut next_seq: u64 = 0;

    loop {
        match armed {
            Some(when) => {
                tokio::select! {
                    _ = time::sleep_until(when) => {
                        phase = Phase::Draining;
                        let now = Instant::now();
                        debug!(?phase, pending = heap.len(), "wakeup fired");
                        let dispatched = core::drain_due(&mut heap, now).await;
                        armed = heap.peek().ok().map(|job| job.due);
                        phase = if armed.is_some() { Phase::Armed } else { Phase::Idle };
                        debug!(dispatched, ?phase, next = ?armed, "drain complete");
                    }
                    maybe = submit_rx.recv() => match maybe {
                        Some(job) => accept(&mut heap, &mut armed, &mut phase, &mut next_seq, job),
                        None => break,
                    },
                    // a fire racing the shutdown is dropped with this select
                    _ = done_rx.recv() => break,
                }
            }
            None => {
                // nothing scheduled; wait for a submission or shutdown
                tokio::select! {
                    maybe = submit_rx.recv() => match maybe {
                        Some(job) => accept(&mut heap, &mut armed, &mut phase, &mut next_seq, job),
                        None => break,
                    },
                    _ = done_rx.recv() => break,
                }
            }
        }
    }

    if !heap.is_empty() {
        debug!(discarded = heap.len(), "discarding pending jobs on shutdown");
    }
    debug!("channel coordinator exited");
}

fn accept(
    heap: &mut MinHeap<Job>,
    armed: &mut Option<Instant>,
    phase: &mut Phase,
    next_seq: &mut u64,
    mut job: Job,
) {
    job.seq = *next_seq;
    *next_seq += 1;
    core::insert_and_rearm(heap, armed, job);
    if *phase == Phase::Idle {
        *phase = Phase::Armed;
    }
}
