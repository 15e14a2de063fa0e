//! Click workers and the scheduler that keeps at most one of them running.

use crate::action::{ActionMode, ActionSpec, Point};
use crate::error::Result;
use crate::input::SharedInput;
use crate::worker::{CancelToken, Ticker, WorkerHandle};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

/// How often a held button checks whether it should be let go.
pub const HOLD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A single click or hold action running on its own thread.
///
/// Workers are single-use: once stopped, build a new one.
pub struct ActionWorker {
    spec: ActionSpec,
    input: SharedInput,
    handle: Option<WorkerHandle>,
}

impl ActionWorker {
    /// Validate `spec` and prepare a worker. Nothing runs until `start`.
    pub fn new(spec: ActionSpec, input: SharedInput) -> Result<Self> {
        spec.validate()?;
        Ok(Self {
            spec,
            input,
            handle: None,
        })
    }

    pub fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    /// Launch the worker thread. Calling it again is a no-op.
    pub fn start(&mut self) -> Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }
        let spec = self.spec;
        let input = self.input.clone();
        let name = match spec.mode {
            ActionMode::Repeat => "click-repeat",
            ActionMode::Hold => "click-hold",
        };
        self.handle = Some(WorkerHandle::spawn(name, move |cancel| match spec.mode {
            ActionMode::Repeat => run_repeat(&spec, &input, &cancel),
            ActionMode::Hold => run_hold(&spec, &input, &cancel),
        })?);
        debug!(
            button = %spec.button,
            rate = spec.rate_per_second,
            mode = ?spec.mode,
            "action worker started"
        );
        Ok(())
    }

    /// Ask the worker to finish and return without waiting for it.
    pub fn stop(&self) {
        if let Some(handle) = &self.handle {
            handle.request_stop();
        }
    }

    /// True while the worker thread is still executing.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(WorkerHandle::is_alive)
    }

    /// Wait for the worker thread and return its outcome.
    pub fn join(mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }
}

fn target(spec: &ActionSpec, input: &SharedInput) -> Result<Point> {
    match spec.position {
        Some(at) => Ok(at),
        None => input.query_position(),
    }
}

fn run_repeat(spec: &ActionSpec, input: &SharedInput, cancel: &CancelToken) -> Result<()> {
    let mut ticker = Ticker::new(spec.period());
    while !cancel.is_cancelled() {
        let at = target(spec, input)?;
        input.click(spec.button, at)?;
        if !ticker.wait(cancel) {
            break;
        }
    }
    Ok(())
}

fn run_hold(spec: &ActionSpec, input: &SharedInput, cancel: &CancelToken) -> Result<()> {
    let held_at = target(spec, input)?;
    input.press(spec.button, held_at)?;

    while cancel.sleep(HOLD_POLL_INTERVAL) {}

    // Let go wherever the pointer is now. If it can't be located, release
    // at the press point so the button is never left down.
    let current = input.query_position();
    let release_at = current.as_ref().copied().unwrap_or(held_at);
    input.release(spec.button, release_at)?;
    current.map(|_| ())
}

/// Owns the one active [`ActionWorker`].
///
/// `start` supersedes whatever was running: the old worker is told to stop
/// before the new one is launched, but is not waited for.
pub struct ActionScheduler {
    input: SharedInput,
    active: Mutex<Option<ActionWorker>>,
}

impl ActionScheduler {
    pub fn new(input: SharedInput) -> Self {
        Self {
            input,
            active: Mutex::new(None),
        }
    }

    /// Replace the active action with one built from `spec`.
    ///
    /// An invalid `spec` is rejected before anything is stopped.
    pub fn start(&self, spec: ActionSpec) -> Result<()> {
        let mut worker = ActionWorker::new(spec, self.input.clone())?;

        let mut active = self.lock();
        if let Some(previous) = active.take() {
            previous.stop();
            debug!("superseded previous action");
        }
        worker.start()?;
        *active = Some(worker);

        info!(
            button = %spec.button,
            rate = spec.rate_per_second,
            mode = ?spec.mode,
            position = ?spec.position,
            "clicking started"
        );
        Ok(())
    }

    /// Stop the active action, if any. Idle schedulers ignore the call.
    pub fn stop(&self) {
        if let Some(worker) = self.lock().take() {
            worker.stop();
            info!("clicking stopped");
        }
    }

    /// True while an action is recorded and its thread is still running.
    pub fn is_active(&self) -> bool {
        self.lock().as_ref().is_some_and(ActionWorker::is_running)
    }

    pub fn active_spec(&self) -> Option<ActionSpec> {
        self.lock().as_ref().map(|worker| *worker.spec())
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActionWorker>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for ActionScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::MouseButton;
    use crate::error::ClickerError;
    use crate::input::mock::{InputEvent, MockInput};
    use std::sync::Arc;
    use std::thread;

    fn mock() -> (Arc<MockInput>, SharedInput) {
        let mock = Arc::new(MockInput::new());
        let shared: SharedInput = mock.clone();
        (mock, shared)
    }

    #[test]
    fn test_worker_rejects_bad_rate() {
        let (_, input) = mock();
        let err = ActionWorker::new(ActionSpec::new(0.0, MouseButton::Primary), input)
            .err()
            .unwrap();
        assert!(matches!(err, ClickerError::InvalidRate { .. }));
    }

    #[test]
    fn test_repeat_uses_fixed_position() {
        let (mock, input) = mock();
        let spec = ActionSpec::new(50.0, MouseButton::Secondary).at(Point::new(7, 9));
        let mut worker = ActionWorker::new(spec, input).unwrap();
        worker.start().unwrap();
        thread::sleep(Duration::from_millis(120));
        worker.stop();
        worker.join().unwrap();

        assert!(mock.clicks() >= 3);
        assert_eq!(mock.position_queries(), 0);
        assert!(mock.events().iter().all(|e| *e
            == InputEvent::Click {
                button: MouseButton::Secondary,
                at: Point::new(7, 9)
            }));
    }

    #[test]
    fn test_hold_releases_at_current_position() {
        let (mock, input) = mock();
        mock.set_position(Point::new(1, 1));
        let spec = ActionSpec::new(1.0, MouseButton::Middle).with_mode(ActionMode::Hold);
        let mut worker = ActionWorker::new(spec, input).unwrap();
        worker.start().unwrap();

        thread::sleep(Duration::from_millis(50));
        mock.set_position(Point::new(40, 50));
        worker.stop();
        worker.join().unwrap();

        let presses: Vec<_> = mock
            .events()
            .into_iter()
            .filter(|e| !matches!(e, InputEvent::QueryPosition))
            .collect();
        assert_eq!(
            presses,
            vec![
                InputEvent::Press {
                    button: MouseButton::Middle,
                    at: Point::new(1, 1)
                },
                InputEvent::Release {
                    button: MouseButton::Middle,
                    at: Point::new(40, 50)
                },
            ]
        );
    }

    #[test]
    fn test_repeat_stops_on_capability_failure() {
        let (mock, input) = mock();
        mock.set_failing(true);
        let mut worker = ActionWorker::new(ActionSpec::new(100.0, MouseButton::Primary), input).unwrap();
        worker.start().unwrap();
        let result = worker.join();
        assert!(matches!(result, Err(ClickerError::Capability { .. })));
    }

    #[test]
    fn test_tiny_rate_clicks_once_and_stops_cleanly() {
        let (mock, input) = mock();
        let spec = ActionSpec::new(1e-300, MouseButton::Primary).at(Point::new(1, 1));
        let mut worker = ActionWorker::new(spec, input).unwrap();
        worker.start().unwrap();
        thread::sleep(Duration::from_millis(200));
        assert!(worker.is_running());
        worker.stop();
        assert!(worker.join().is_ok());
        assert_eq!(mock.clicks(), 1);
    }

    #[test]
    fn test_hold_releases_at_press_point_when_query_fails() {
        let (mock, input) = mock();
        mock.set_position(Point::new(5, 6));
        let spec = ActionSpec::new(1.0, MouseButton::Primary).with_mode(ActionMode::Hold);
        let mut worker = ActionWorker::new(spec, input).unwrap();
        worker.start().unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while mock.presses() == 0 && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        mock.set_position(Point::new(70, 80));
        mock.set_operation_failing("query_position", true);
        worker.stop();

        match worker.join() {
            Err(ClickerError::Capability { operation, .. }) => assert_eq!(operation, "query_position"),
            other => panic!("expected query failure, got {other:?}"),
        }
        assert_eq!(mock.presses(), 1);
        assert_eq!(mock.releases(), 1);
        assert!(mock.events().contains(&InputEvent::Release {
            button: MouseButton::Primary,
            at: Point::new(5, 6)
        }));
    }

    #[test]
    fn test_scheduler_stop_when_idle_is_noop() {
        let (_, input) = mock();
        let scheduler = ActionScheduler::new(input);
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_active());
        assert!(scheduler.active_spec().is_none());
    }

    #[test]
    fn test_scheduler_invalid_spec_keeps_current_action() {
        let (_, input) = mock();
        let scheduler = ActionScheduler::new(input);
        let good = ActionSpec::new(10.0, MouseButton::Primary);
        scheduler.start(good).unwrap();

        assert!(scheduler.start(ActionSpec::new(-1.0, MouseButton::Primary)).is_err());
        assert_eq!(scheduler.active_spec(), Some(good));
        assert!(scheduler.is_active());
        scheduler.stop();
    }
}
