//! Deferred-execution job scheduler.
//!
//! Callers submit a zero-argument unit of work plus a delay; the work runs
//! no earlier than `now + delay`. A binary min-heap orders pending jobs by
//! due time and a single armed wakeup covers the earliest of them. Two
//! coordinator disciplines satisfy one [`Scheduler`] contract, picked at
//! construction: mutex-guarded shared state with a background waiter, or a
//! single owning task fed over channels.
//!
//! Only a partial dispatch order is guaranteed: within one drain pass, jobs
//! due earlier go first, and equal due times fall back to acceptance order.
//! There is no per-job cancellation and no backpressure; [`Scheduler::stop`]
//! discards everything still pending.

pub mod errors;
pub mod heap;
pub mod sched;

pub use errors::SchedError;
pub use heap::MinHeap;
pub use sched::{Discipline, Scheduler, Work, new_scheduler};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{self, Duration};

    use crate::sched::locking::LockingScheduler;

    /// Let spawned dispatch tasks run to completion on the test runtime.
    async fn settle() {
        for _ in 0..32 {
            tokio::task::yield_now().await;
        }
    }

    async fn earlier_deadline_replaces_wakeup(discipline: Discipline) {
        let mut s = new_scheduler(discipline);
        s.start().unwrap();

        let order = Arc::new(StdMutex::new(Vec::new()));
        let o = order.clone();
        s.schedule(Box::new(move || o.lock().unwrap().push("a")), 50)
            .await
            .unwrap();
        // due earlier than the already-armed job: the wakeup must move
        let o = order.clone();
        s.schedule(Box::new(move || o.lock().unwrap().push("b")), 10)
            .await
            .unwrap();

        time::sleep(Duration::from_millis(80)).await;
        settle().await;
        assert_eq!(*order.lock().unwrap(), vec!["b", "a"]);
        s.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn earlier_deadline_replaces_wakeup_locking() {
        earlier_deadline_replaces_wakeup(Discipline::Locking).await;
    }

    #[tokio::test(start_paused = true)]
    async fn earlier_deadline_replaces_wakeup_channel() {
        earlier_deadline_replaces_wakeup(Discipline::Channel).await;
    }

    async fn stop_discards_pending(discipline: Discipline) {
        let mut s = new_scheduler(discipline);
        s.start().unwrap();

        let ran = Arc::new(AtomicUsize::new(0));
        let r = ran.clone();
        s.schedule(
            Box::new(move || {
                r.fetch_add(1, Ordering::SeqCst);
            }),
            50,
        )
        .await
        .unwrap();

        s.stop().await.unwrap();
        time::sleep(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(ran.load(Ordering::SeqCst), 0, "stopped job must never run");
    }

    #[tokio::test(start_paused = true)]
    async fn stop_discards_pending_locking() {
        stop_discards_pending(Discipline::Locking).await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_discards_pending_channel() {
        stop_discards_pending(Discipline::Channel).await;
    }

    async fn illegal_states_are_errors(discipline: Discipline) {
        let mut s = new_scheduler(discipline);
        assert_eq!(
            s.schedule(Box::new(|| {}), 1).await,
            Err(SchedError::NotStarted)
        );
        assert_eq!(s.stop().await, Err(SchedError::NotStarted));

        s.start().unwrap();
        assert_eq!(s.start(), Err(SchedError::AlreadyStarted));
        s.stop().await.unwrap();

        assert_eq!(s.stop().await, Err(SchedError::AlreadyStopped));
        assert_eq!(
            s.schedule(Box::new(|| {}), 1).await,
            Err(SchedError::AlreadyStopped)
        );
        assert_eq!(s.start(), Err(SchedError::AlreadyStopped));
    }

    #[tokio::test(start_paused = true)]
    async fn illegal_states_are_errors_locking() {
        illegal_states_are_errors(Discipline::Locking).await;
    }

    #[tokio::test(start_paused = true)]
    async fn illegal_states_are_errors_channel() {
        illegal_states_are_errors(Discipline::Channel).await;
    }

    async fn equal_due_times_dispatch_in_acceptance_order(discipline: Discipline) {
        let mut s = new_scheduler(discipline);
        s.start().unwrap();

        let order = Arc::new(StdMutex::new(Vec::new()));
        // no time passes between submissions under the paused clock, so all
        // three share one due instant and only seq breaks the tie
        for i in 0..3usize {
            let o = order.clone();
            s.schedule(Box::new(move || o.lock().unwrap().push(i)), 5)
                .await
                .unwrap();
        }

        time::sleep(Duration::from_millis(20)).await;
        settle().await;
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
        s.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn equal_due_times_dispatch_in_acceptance_order_locking() {
        equal_due_times_dispatch_in_acceptance_order(Discipline::Locking).await;
    }

    #[tokio::test(start_paused = true)]
    async fn equal_due_times_dispatch_in_acceptance_order_channel() {
        equal_due_times_dispatch_in_acceptance_order(Discipline::Channel).await;
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_submitters_each_job_runs_exactly_once() {
        const SUBMITTERS: usize = 8;
        const PER_SUBMITTER: usize = 1250;

        let mut s = LockingScheduler::new();
        s.start().unwrap();
        let s = Arc::new(s);

        let counter = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for _ in 0..SUBMITTERS {
            let s = s.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..PER_SUBMITTER {
                    let c = counter.clone();
                    s.schedule(
                        Box::new(move || {
                            c.fetch_add(1, Ordering::SeqCst);
                        }),
                        (i % 50) as u64,
                    )
                    .await
                    .unwrap();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        time::sleep(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), SUBMITTERS * PER_SUBMITTER);

        let mut s = Arc::try_unwrap(s).ok().expect("submitters dropped their handles");
        s.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_callback_does_not_halt_the_coordinator() {
        let mut s = new_scheduler(Discipline::Channel);
        s.start().unwrap();

        let ran = Arc::new(AtomicUsize::new(0));
        s.schedule(Box::new(|| panic!("callback blew up")), 5)
            .await
            .unwrap();
        let r = ran.clone();
        s.schedule(
            Box::new(move || {
                r.fetch_add(1, Ordering::SeqCst);
            }),
            10,
        )
        .await
        .unwrap();

        time::sleep(Duration::from_millis(50)).await;
        settle().await;
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        s.stop().await.unwrap();
    }
}
