//! Pointer position sampling for live coordinate display.

use crate::action::Point;
use crate::error::Result;
use crate::input::SharedInput;
use crate::worker::{Ticker, WorkerHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Sampling cadence while active (20 Hz).
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(50);

/// How long a paused sampler sleeps between checks.
pub const PAUSED_INTERVAL: Duration = Duration::from_millis(250);

/// Latest pointer position as published by the sampler thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampledPosition {
    pub position: Point,
    pub paused: bool,
}

/// Background thread that polls the pointer position and reports it.
///
/// Unlike click workers a sampler is paused and resumed in place. Once
/// stopped it stays inert; create a new one to sample again.
pub struct PositionSampler {
    paused: Arc<AtomicBool>,
    handle: WorkerHandle,
    receiver: watch::Receiver<SampledPosition>,
}

impl PositionSampler {
    /// Start sampling immediately, calling `on_sample` with every reading.
    pub fn start<F>(input: SharedInput, on_sample: F) -> Result<Self>
    where
        F: FnMut(Point) + Send + 'static,
    {
        Self::spawn(input, on_sample, false)
    }

    /// Start the thread in the paused state.
    pub fn start_paused<F>(input: SharedInput, on_sample: F) -> Result<Self>
    where
        F: FnMut(Point) + Send + 'static,
    {
        Self::spawn(input, on_sample, true)
    }

    fn spawn<F>(input: SharedInput, mut on_sample: F, paused: bool) -> Result<Self>
    where
        F: FnMut(Point) + Send + 'static,
    {
        let paused = Arc::new(AtomicBool::new(paused));
        let (sender, receiver) = watch::channel(SampledPosition {
            position: Point::default(),
            paused: paused.load(Ordering::SeqCst),
        });

        let flag = paused.clone();
        let handle = WorkerHandle::spawn("position-sampler", move |cancel| {
            let mut ticker = Ticker::new(SAMPLE_INTERVAL);
            while !cancel.is_cancelled() {
                if flag.load(Ordering::SeqCst) {
                    sender.send_if_modified(|sample| !std::mem::replace(&mut sample.paused, true));
                    if !cancel.sleep(PAUSED_INTERVAL) {
                        break;
                    }
                    continue;
                }

                let position = input.query_position()?;
                sender.send_replace(SampledPosition {
                    position,
                    paused: false,
                });
                on_sample(position);

                if !ticker.wait(&cancel) {
                    break;
                }
            }
            Ok(())
        })?;

        Ok(Self {
            paused,
            handle,
            receiver,
        })
    }

    pub fn pause(&self) {
        if !self.paused.swap(true, Ordering::SeqCst) {
            debug!("position sampler paused");
        }
    }

    pub fn unpause(&self) {
        if self.paused.swap(false, Ordering::SeqCst) {
            debug!("position sampler resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Permanently stop sampling. Returns without waiting for the thread.
    pub fn stop(&self) {
        self.handle.request_stop();
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.is_stop_requested()
    }

    /// True while the sampler thread is executing, paused or not.
    pub fn is_running(&self) -> bool {
        self.handle.is_alive()
    }

    /// Receiver that always holds the most recent sample.
    pub fn subscribe(&self) -> watch::Receiver<SampledPosition> {
        self.receiver.clone()
    }

    pub fn latest(&self) -> SampledPosition {
        *self.receiver.borrow()
    }
}

impl Drop for PositionSampler {
    fn drop(&mut self) {
        self.stop();
    }
}
