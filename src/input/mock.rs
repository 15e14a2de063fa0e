//! In-memory input backend for tests.
//!
//! `MockInput` performs no OS calls. Every pointer action and position query
//! is recorded with a timestamp so tests can assert on order and spacing,
//! key state is scripted with [`MockInput::set_key_down`], and
//! [`MockInput::set_failing`] makes every call return a capability error.
//! [`MockInput::set_operation_failing`] does the same for a single call name
//! (`"click"`, `"press"`, `"release"`, `"query_position"`, `"is_key_down"`).

use crate::action::{MouseButton, Point};
use crate::error::{ClickerError, Result};
use crate::input::keys::normalize_key;
use crate::input::InputCapability;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// One call observed by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    QueryPosition,
    Click { button: MouseButton, at: Point },
    Press { button: MouseButton, at: Point },
    Release { button: MouseButton, at: Point },
}

#[derive(Default)]
pub struct MockInput {
    events: Mutex<Vec<(Instant, InputEvent)>>,
    position: Mutex<Point>,
    keys_down: Mutex<HashSet<String>>,
    key_polls: Mutex<HashMap<String, usize>>,
    failing: AtomicBool,
    failing_operations: Mutex<HashSet<&'static str>>,
}

impl MockInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Where `query_position` reports the pointer to be.
    pub fn set_position(&self, at: Point) {
        *self.position.lock().unwrap() = at;
    }

    pub fn set_key_down(&self, key: &str, down: bool) {
        let mut keys = self.keys_down.lock().unwrap();
        if down {
            keys.insert(normalize_key(key));
        } else {
            keys.remove(&normalize_key(key));
        }
    }

    /// When set, every call fails with `ClickerError::Capability`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// When set, only calls to `operation` fail.
    pub fn set_operation_failing(&self, operation: &'static str, failing: bool) {
        let mut operations = self.failing_operations.lock().unwrap();
        if failing {
            operations.insert(operation);
        } else {
            operations.remove(operation);
        }
    }

    /// Snapshot of every recorded call, in order.
    pub fn events(&self) -> Vec<InputEvent> {
        self.events.lock().unwrap().iter().map(|(_, e)| *e).collect()
    }

    /// Snapshot of every recorded call with the instant it happened.
    pub fn timed_events(&self) -> Vec<(Instant, InputEvent)> {
        self.events.lock().unwrap().clone()
    }

    pub fn clicks(&self) -> usize {
        self.count(|e| matches!(e, InputEvent::Click { .. }))
    }

    pub fn presses(&self) -> usize {
        self.count(|e| matches!(e, InputEvent::Press { .. }))
    }

    pub fn releases(&self) -> usize {
        self.count(|e| matches!(e, InputEvent::Release { .. }))
    }

    pub fn position_queries(&self) -> usize {
        self.count(|e| matches!(e, InputEvent::QueryPosition))
    }

    /// Number of times `is_key_down` was asked about `key`.
    pub fn key_polls(&self, key: &str) -> usize {
        self.key_polls
            .lock()
            .unwrap()
            .get(&normalize_key(key))
            .copied()
            .unwrap_or(0)
    }

    fn count(&self, pred: impl Fn(&InputEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, e)| pred(e))
            .count()
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst)
            || self.failing_operations.lock().unwrap().contains(operation)
        {
            return Err(ClickerError::capability(operation, "mock failure"));
        }
        Ok(())
    }

    fn record(&self, operation: &'static str, event: InputEvent) -> Result<()> {
        self.check(operation)?;
        self.events.lock().unwrap().push((Instant::now(), event));
        Ok(())
    }
}

impl InputCapability for MockInput {
    fn click(&self, button: MouseButton, at: Point) -> Result<()> {
        self.record("click", InputEvent::Click { button, at })
    }

    fn press(&self, button: MouseButton, at: Point) -> Result<()> {
        self.record("press", InputEvent::Press { button, at })
    }

    fn release(&self, button: MouseButton, at: Point) -> Result<()> {
        self.record("release", InputEvent::Release { button, at })
    }

    fn query_position(&self) -> Result<Point> {
        self.record("query_position", InputEvent::QueryPosition)?;
        Ok(*self.position.lock().unwrap())
    }

    fn is_key_down(&self, key: &str) -> Result<bool> {
        self.check("is_key_down")?;
        let key = normalize_key(key);
        *self.key_polls.lock().unwrap().entry(key.clone()).or_default() += 1;
        Ok(self.keys_down.lock().unwrap().contains(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mock = MockInput::new();
        mock.set_position(Point::new(10, 20));

        let at = mock.query_position().unwrap();
        mock.press(MouseButton::Primary, at).unwrap();
        mock.release(MouseButton::Primary, at).unwrap();

        assert_eq!(
            mock.events(),
            vec![
                InputEvent::QueryPosition,
                InputEvent::Press {
                    button: MouseButton::Primary,
                    at: Point::new(10, 20)
                },
                InputEvent::Release {
                    button: MouseButton::Primary,
                    at: Point::new(10, 20)
                },
            ]
        );
    }

    #[test]
    fn test_key_state_is_case_insensitive() {
        let mock = MockInput::new();
        mock.set_key_down("G", true);
        assert!(mock.is_key_down("g").unwrap());
        mock.set_key_down("g", false);
        assert!(!mock.is_key_down("G").unwrap());
        assert_eq!(mock.key_polls("g"), 2);
    }

    #[test]
    fn test_failure_injection() {
        let mock = MockInput::new();
        mock.set_failing(true);
        assert!(matches!(
            mock.click(MouseButton::Middle, Point::default()),
            Err(ClickerError::Capability { .. })
        ));
        assert!(mock.is_key_down("g").is_err());
        assert!(mock.events().is_empty());
    }

    #[test]
    fn test_single_operation_failure() {
        let mock = MockInput::new();
        mock.set_operation_failing("query_position", true);
        assert!(mock.query_position().is_err());
        assert!(mock.click(MouseButton::Primary, Point::default()).is_ok());

        mock.set_operation_failing("query_position", false);
        assert!(mock.query_position().is_ok());
    }
}
