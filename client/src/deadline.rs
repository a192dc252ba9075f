//! A guarded operation runs on its own OS thread with its own runtime, so an
//! operation that blocks the thread cannot hold the caller past the deadline.
//! On expiry the caller gets [`Guarded::TimedOut`] at once and the worker is
//! detached: an operation that yields is dropped at its next await point,
//! one that blocks runs to completion and its result is discarded.

use std::{future::Future, time::Duration};

use synapse_logger::{prelude::*, Instrument as _};
use tokio::sync::oneshot;

use crate::Error;

/// Result of a guarded operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    /// Operation finished before the deadline
    Completed(T),
    /// Deadline elapsed; the result of the operation, if any, is discarded
    TimedOut,
}

impl<T> Guarded<T> {
    /// Value of a completed operation.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::TimedOut => None,
        }
    }
}

/// Wall-clock limit on a single operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineGuard {
    ttl: Duration,
}

impl DeadlineGuard {
    /// Guard with time-to-live `ttl`.
    pub const fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Time-to-live of guarded operations
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Run `operation` on a worker thread for at most [`Self::ttl`].
    ///
    /// The result of an operation which finishes within the deadline is
    /// passed through unchanged. Otherwise [`Guarded::TimedOut`] is returned
    /// as soon as the deadline elapses, without waiting for the worker.
    ///
    /// # Errors
    /// - The worker thread or its runtime cannot be started
    /// - The operation panicked before the deadline
    pub async fn run<F>(&self, operation: F) -> Result<Guarded<F::Output>, Error>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let operation = operation.in_current_span();
        let (mut result_tx, result_rx) = oneshot::channel();

        // the handle is dropped; on expiry the thread continues detached
        let _handle: std::thread::JoinHandle<_> = std::thread::Builder::new()
            .name("deadline_worker".to_owned())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(error) => {
                        let _ = result_tx.send(Err(Error::Runtime(error)));
                        return;
                    }
                };
                runtime.block_on(async move {
                    let mut task = tokio::spawn(operation);
                    let joined = tokio::select! {
                        joined = &mut task => Some(joined),
                        () = result_tx.closed() => None,
                    };
                    match joined {
                        // the receiver might be dropped
                        Some(joined) => {
                            let _ = result_tx.send(joined.map_err(Error::WorkerPanicked));
                        }
                        None => {
                            task.abort();
                            debug!("Worker cancelled after its deadline");
                        }
                    }
                });
            })
            .map_err(Error::Runtime)?;

        match tokio::time::timeout(self.ttl, result_rx).await {
            Ok(Ok(result)) => result.map(Guarded::Completed),
            Ok(Err(_closed)) => Err(Error::WorkerLost),
            Err(_elapsed) => {
                debug!(ttl = ?self.ttl, "Deadline elapsed, worker detached");
                Ok(Guarded::TimedOut)
            }
        }
    }
}
