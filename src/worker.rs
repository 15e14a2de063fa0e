//! Background worker plumbing shared by the clicker, sampler and hotkeys.
//!
//! Every worker runs on its own named OS thread and is cancelled
//! cooperatively: the owner flips a [`CancelToken`] and the loop notices it
//! at its next poll. Nothing is ever force-terminated.

use crate::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Longest a cancellable sleep goes without re-checking its token.
pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Stand-in deadline when a period would overflow `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

fn deadline_after(from: Instant, period: Duration) -> Instant {
    from.checked_add(period)
        .or_else(|| from.checked_add(FAR_FUTURE))
        .unwrap_or(from)
}

/// Cooperative cancellation flag shared between an owner and its worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`, waking at least every [`CANCEL_POLL_INTERVAL`].
    /// Returns `false` if cancelled before the time ran out.
    pub fn sleep(&self, duration: Duration) -> bool {
        self.sleep_until(deadline_after(Instant::now(), duration))
    }

    pub fn sleep_until(&self, deadline: Instant) -> bool {
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(CANCEL_POLL_INTERVAL));
        }
    }
}

/// Fixed-rate clock. Ticks are scheduled from the previous deadline, not
/// from when the work finished, so slow work does not add up as drift.
/// A tick that is already late fires at once and the schedule restarts from
/// there; missed ticks are never replayed.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next: deadline_after(Instant::now(), period),
        }
    }

    /// Block until the next tick. Returns `false` if cancelled meanwhile.
    pub fn wait(&mut self, cancel: &CancelToken) -> bool {
        let now = Instant::now();
        if now < self.next {
            if !cancel.sleep_until(self.next) {
                return false;
            }
            self.next = deadline_after(self.next, self.period);
        } else {
            self.next = deadline_after(now, self.period);
        }
        !cancel.is_cancelled()
    }
}

/// Clears the liveness flag when the worker thread exits, panics included.
struct AliveGuard(Arc<AtomicBool>);

impl Drop for AliveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owned reference to a running worker thread.
///
/// Dropping the handle requests a stop but does not wait for the thread.
pub struct WorkerHandle {
    name: String,
    cancel: CancelToken,
    alive: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl WorkerHandle {
    /// Run `body` on a new thread named `name`. The body receives the token
    /// it must poll; an `Err` it returns is logged once and kept for `join`.
    pub fn spawn<F>(name: impl Into<String>, body: F) -> Result<Self>
    where
        F: FnOnce(CancelToken) -> Result<()> + Send + 'static,
    {
        let name = name.into();
        let cancel = CancelToken::new();
        let alive = Arc::new(AtomicBool::new(true));

        let token = cancel.clone();
        let guard = AliveGuard(alive.clone());
        let worker_name = name.clone();
        let thread = thread::Builder::new().name(name.clone()).spawn(move || {
            let _guard = guard;
            debug!(worker = %worker_name, "worker started");
            let result = body(token);
            match &result {
                Ok(()) => debug!(worker = %worker_name, "worker finished"),
                Err(e) => error!(worker = %worker_name, error = %e, "worker stopped after failure"),
            }
            result
        })?;

        Ok(Self {
            name,
            cancel,
            alive,
            thread: Some(thread),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flip the cancellation flag and return immediately.
    pub fn request_stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// True until the worker thread has returned.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Wait for the thread to exit and hand back what the body returned.
    /// Does not request a stop on its own.
    pub fn join(mut self) -> Result<()> {
        match self.thread.take() {
            Some(thread) => match thread.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            },
            None => Ok(()),
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("name", &self.name)
            .field("stop_requested", &self.is_stop_requested())
            .field("alive", &self.is_alive())
            .finish()
    }
}
