//! # Concurrency Scheduler
//!
//! Executes a large number of independent probe operations under a hard cap
//! on simultaneous in-flight tasks. Every dispatched task is reported exactly
//! once; completion order is unspecified, so results must carry their own
//! originating key.
//!
//! Two independent pools exist per scan: a host pool bounding liveness
//! probes and a port pool bounding port probes per host batch, so the real
//! ceiling is the product of the two rather than an unbounded multiplier.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// A bounded dispatch pool.
///
/// When the pool's [`CancellationToken`] fires, dispatching stops, queued
/// completions are drained, and in-flight tasks are abandoned rather than
/// awaited.
#[derive(Clone)]
pub struct Pool {
    permits: Arc<Semaphore>,
    delay: Option<Duration>,
    cancel: CancellationToken,
}

impl Pool {
    pub fn new(limit: usize, cancel: CancellationToken) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(limit.max(1))),
            delay: None,
            cancel,
        }
    }

    /// Insert a jittered pause between dispatches. Serializes throughput in
    /// exchange for a flatter load profile (stealth scans).
    pub fn with_delay(mut self, delay: Option<Duration>) -> Self {
        self.delay = delay;
        self
    }

    /// Runs `task` over every item, never exceeding the pool limit, and
    /// collects whatever completed before the work drained or the pool was
    /// cancelled.
    pub async fn run<I, T, F, Fut>(&self, items: I, task: F) -> Vec<T>
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        T: Send + 'static,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();
        let mut dispatched: usize = 0;

        for item in items {
            if self.cancel.is_cancelled() {
                break;
            }

            if let Some(base) = self.delay {
                tokio::time::sleep(jittered(base)).await;
            }

            let permit = tokio::select! {
                biased;
                permit = self.permits.clone().acquire_owned() => match permit {
                    Ok(p) => p,
                    // The semaphore is never closed while the pool lives.
                    Err(_) => break,
                },
                _ = self.cancel.cancelled() => break,
            };

            let fut = task(item);
            let tx = tx.clone();
            dispatched += 1;
            tokio::spawn(async move {
                let out = fut.await;
                drop(permit);
                // The receiver may be gone after cancellation; the result
                // is then intentionally discarded.
                let _ = tx.send(out);
            });
        }
        drop(tx);

        let mut results = Vec::with_capacity(dispatched);
        loop {
            tokio::select! {
                biased;
                received = rx.recv() => match received {
                    Some(out) => results.push(out),
                    None => break,
                },
                _ = self.cancel.cancelled() => {
                    // Keep anything already queued, abandon the rest.
                    while let Ok(out) = rx.try_recv() {
                        results.push(out);
                    }
                    break;
                }
            }
        }

        trace!(dispatched, completed = results.len(), "pool drained");
        results
    }
}

fn jittered(base: Duration) -> Duration {
    base.mul_f64(rand::random_range(0.5..1.5))
}
