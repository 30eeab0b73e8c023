//! Single-Flight Module
//!
//! Generic coalescing primitive: when several concurrent callers trigger the
//! same operation, exactly one underlying call runs and every caller
//! receives its settled result (value or error alike).
//!
//! State machine: Idle -> Refreshing on the first call (the in-flight handle
//! is recorded), joining calls subscribe to the same handle, and settlement
//! clears the handle before the result is published so the next call starts
//! a fresh operation.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use crate::error::{CacheError, Result};

// == Single Flight ==
/// Coalesces concurrent invocations of one logical async operation.
///
/// The underlying future runs on a detached task, so it settles (and
/// publishes to every joiner) even if the caller that started it is dropped.
/// No timeout is imposed: a hung operation holds all coalesced callers.
pub struct SingleFlight<T> {
    /// The in-flight handle; `Some` while an operation is running.
    /// The generation tag lets a settling operation clear only its own
    /// handle, never one installed after a `reset`.
    inflight: Arc<Mutex<Option<(u64, broadcast::Sender<Result<T>>)>>>,
    next_generation: AtomicU64,
}

impl<T: Clone + Send + 'static> SingleFlight<T> {
    // == Constructor ==
    /// Creates an idle single-flight slot.
    pub fn new() -> Self {
        Self {
            inflight: Arc::new(Mutex::new(None)),
            next_generation: AtomicU64::new(0),
        }
    }

    // == Run ==
    /// Runs `op` unless one is already in flight, in which case `op` is
    /// dropped unused and this call joins the in-flight operation. All
    /// callers receive the identical settled result.
    pub async fn run<F, Fut>(&self, op: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let mut receiver = {
            let mut inflight = self.inflight.lock().await;
            match inflight.as_ref() {
                Some((_, sender)) => sender.subscribe(),
                None => {
                    let (sender, receiver) = broadcast::channel(1);
                    let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                    *inflight = Some((generation, sender.clone()));

                    let slot = Arc::clone(&self.inflight);
                    let future = op();
                    tokio::spawn(async move {
                        let result = future.await;
                        // Clear the handle before publishing so a caller
                        // reacting to the result can immediately start a
                        // fresh operation
                        {
                            let mut slot = slot.lock().await;
                            if matches!(*slot, Some((current, _)) if current == generation) {
                                *slot = None;
                            }
                        }
                        let _ = sender.send(result);
                    });
                    receiver
                }
            }
        };

        match receiver.recv().await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Internal(
                "in-flight operation dropped without settling".to_string(),
            )),
        }
    }

    // == Reset ==
    /// Forcibly clears the in-flight handle without waiting for settlement.
    /// Test/debug hook, not part of normal operation; callers already joined
    /// to the abandoned operation still receive its result.
    pub async fn reset(&self) {
        *self.inflight.lock().await = None;
    }

    // == Is In Flight ==
    /// True while an operation is recorded as running.
    pub async fn is_inflight(&self) -> bool {
        self.inflight.lock().await.is_some()
    }
}

impl<T: Clone + Send + 'static> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}
