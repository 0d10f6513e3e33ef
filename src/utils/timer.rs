//! Cancellable scheduled tasks

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// A single delayed callback slot. Scheduling again replaces the pending callback.
#[derive(Debug, Default)]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Run `f` after `delay`, aborting whatever was pending
    pub fn schedule<F>(&mut self, delay: Duration, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            sleep(delay).await;
            f();
        }));
    }

    /// Abort the pending callback, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A boolean that clears itself `ttl` after the most recent [`raise`](Self::raise).
#[derive(Debug)]
pub struct ExpiringFlag {
    ttl: Duration,
    set: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    reset: ScheduledTask,
}

impl ExpiringFlag {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            set: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            reset: ScheduledTask::new(),
        }
    }

    /// Set the flag and restart its expiry timer
    pub fn raise(&mut self) {
        let this_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.set.store(true, Ordering::SeqCst);

        let set = Arc::clone(&self.set);
        let generation = Arc::clone(&self.generation);
        self.reset.schedule(self.ttl, move || {
            // A reset that already woke up must not clear a newer raise
            if generation.load(Ordering::SeqCst) == this_generation {
                set.store(false, Ordering::SeqCst);
            }
        });
    }

    pub fn is_set(&self) -> bool {
        self.set.load(Ordering::SeqCst)
    }
}
