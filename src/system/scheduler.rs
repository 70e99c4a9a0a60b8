use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::record::Snapshot;
use super::sampler::Sampler;
use super::source::{ProcessSource, SampleError};

/// What each tick publishes. Published snapshots are never mutated.
pub type SampleOutcome = Result<Arc<Snapshot>, SampleError>;

struct Running<S> {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Option<Sampler<S>>>,
}

/// Drives a [`Sampler`] on a fixed interval.
///
/// Sampling runs on the blocking pool so a slow OS enumeration never stalls the
/// caller's runtime thread. Ticks are strictly sequential: the sampler is moved
/// into each blocking call and back out, so two snapshots never overlap.
pub struct SamplingScheduler<S> {
    interval: Duration,
    idle: Option<Sampler<S>>,
    running: Option<Running<S>>,
}

impl<S: ProcessSource + Send + 'static> SamplingScheduler<S> {
    pub fn new(sampler: Sampler<S>, interval: Duration) -> Self {
        SamplingScheduler {
            interval,
            idle: Some(sampler),
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Starts ticking; returns false when already running or the sampler was lost.
    pub fn start(&mut self, publish: mpsc::UnboundedSender<SampleOutcome>) -> bool {
        if self.running.is_some() {
            return false;
        }
        let Some(sampler) = self.idle.take() else {
            return false;
        };

        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_ticks(sampler, self.interval, publish, shutdown_rx));
        self.running = Some(Running { shutdown, task });
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "sampling started");
        true
    }

    /// Stops scheduling further ticks and waits for an in-flight sample to finish.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.shutdown.send(true);
        match running.task.await {
            Ok(sampler) => self.idle = sampler,
            Err(err) => tracing::error!(%err, "sampling task ended abnormally"),
        }
        tracing::info!("sampling stopped");
    }
}

async fn run_ticks<S: ProcessSource + Send + 'static>(
    mut sampler: Sampler<S>,
    interval: Duration,
    publish: mpsc::UnboundedSender<SampleOutcome>,
    mut shutdown: watch::Receiver<bool>,
) -> Option<Sampler<S>> {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }
        if *shutdown.borrow() {
            break;
        }

        let sampled = tokio::task::spawn_blocking(move || {
            let outcome = sampler.snapshot();
            (sampler, outcome)
        })
        .await;
        let outcome = match sampled {
            Ok((returned, outcome)) => {
                sampler = returned;
                outcome
            }
            Err(err) => {
                tracing::error!(%err, "sampler panicked; sampling halted");
                return None;
            }
        };

        if let Err(err) = &outcome {
            tracing::warn!(%err, "sampling tick failed");
        }
        if publish.send(outcome.map(Arc::new)).is_err() {
            break;
        }
    }

    Some(sampler)
}
