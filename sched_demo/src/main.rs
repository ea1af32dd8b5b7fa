// src/main.rs
mod config;

use anyhow::Result;
use jobsched::{Scheduler, new_scheduler};
use rand::Rng;
use tokio::sync::mpsc;
use tokio::time::{self, Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // -------- logging ----------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("sched_demo=info".parse()?)
                .add_directive("jobsched=debug".parse()?),
        )
        .compact()
        .init();

    // -------- config ----------
    let cfg = config::Cli::parse_and_build_config()?;
    info!(?cfg, "scheduler demo starting");

    let mut sched = new_scheduler(cfg.discipline);
    sched.start()?;

    // each job reports back here when it has run
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<usize>();
    let mut submitted = 0usize;

    if cfg.random > 0 {
        let mut rng = rand::rng();
        for serial in 0..cfg.random {
            let delay = rng.random_range(1..=cfg.max_delay_ms);
            submit(&*sched, serial, delay, &done_tx).await?;
            submitted += 1;
        }
    } else {
        // walk the arg list: schedule, sleep, schedule, sleep...
        let mut do_schedule = true;
        for &n in &cfg.millis {
            if do_schedule {
                submit(&*sched, submitted, n, &done_tx).await?;
                submitted += 1;
            } else {
                info!(ms = n, "sleeping between submissions");
                time::sleep(Duration::from_millis(n)).await;
            }
            do_schedule = !do_schedule;
        }
    }

    drop(done_tx);
    let mut completed = 0usize;
    while completed < submitted {
        if done_rx.recv().await.is_none() {
            break;
        }
        completed += 1;
    }
    info!(completed, "all scheduled jobs done");

    sched.stop().await?;
    Ok(())
}

async fn submit(
    sched: &dyn Scheduler,
    serial: usize,
    delay_ms: u64,
    done: &mpsc::UnboundedSender<usize>,
) -> Result<()> {
    let wanted = Instant::now() + Duration::from_millis(delay_ms);
    let done = done.clone();
    info!(serial, delay_ms, "scheduling job");
    sched
        .schedule(
            Box::new(move || {
                let late_us = wanted.elapsed().as_micros();
                info!(serial, late_us, "job ran");
                let _ = done.send(serial);
            }),
            delay_ms,
        )
        .await?;
    Ok(())
}
