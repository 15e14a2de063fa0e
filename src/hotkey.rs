//! Global hotkeys by polling key state.
//!
//! Each bound key gets a [`HotkeyWatcher`] thread that asks the input
//! backend whether the key is down 20 times a second. In toggle mode the
//! callback fires once per press; otherwise it fires on every poll that
//! sees the key held.

use crate::error::Result;
use crate::input::keys::{is_blank, normalize_key, parse_key};
use crate::input::SharedInput;
use crate::worker::{Ticker, WorkerHandle};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

/// Key-state polling cadence (20 Hz).
pub const KEY_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub type HotkeyCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyState {
    #[default]
    Up,
    Down,
}

/// Decides from successive key observations whether a binding fires.
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    state: KeyState,
    toggle: bool,
}

impl EdgeDetector {
    pub fn new(toggle: bool) -> Self {
        Self {
            state: KeyState::Up,
            toggle,
        }
    }

    /// Record one poll. Returns `true` if the callback should run.
    pub fn observe(&mut self, down: bool) -> bool {
        let next = if down { KeyState::Down } else { KeyState::Up };
        let previous = std::mem::replace(&mut self.state, next);
        down && (!self.toggle || previous == KeyState::Up)
    }

    pub fn state(&self) -> KeyState {
        self.state
    }
}

/// Polling thread for one key.
pub struct HotkeyWatcher {
    key: String,
    handle: WorkerHandle,
}

impl HotkeyWatcher {
    pub fn start(
        key: &str,
        input: SharedInput,
        callback: HotkeyCallback,
        toggle: bool,
    ) -> Result<Self> {
        let key = normalize_key(key);
        let polled = key.clone();
        let handle = WorkerHandle::spawn(format!("hotkey-{key}"), move |cancel| {
            let mut detector = EdgeDetector::new(toggle);
            let mut ticker = Ticker::new(KEY_POLL_INTERVAL);
            while !cancel.is_cancelled() {
                let down = input.is_key_down(&polled)?;
                if detector.observe(down) && !cancel.is_cancelled() {
                    callback();
                }
                if !ticker.wait(&cancel) {
                    break;
                }
            }
            Ok(())
        })?;

        Ok(Self { key, handle })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn stop(&self) {
        self.handle.request_stop();
    }

    /// False once the polling thread has exited, including after a failed
    /// key-state query.
    pub fn is_running(&self) -> bool {
        self.handle.is_alive()
    }
}

/// Key name to watcher map. One watcher per key; all mutation goes
/// through a single lock.
///
/// A watcher whose thread has died stays in the map until the key is bound
/// or unbound again, but no longer counts as bound.
pub struct HotkeyRegistry {
    input: SharedInput,
    watchers: Mutex<HashMap<String, HotkeyWatcher>>,
}

impl HotkeyRegistry {
    pub fn new(input: SharedInput) -> Self {
        Self {
            input,
            watchers: Mutex::new(HashMap::new()),
        }
    }

    /// Start watching `key`, replacing any existing binding for it.
    ///
    /// A blank key is ignored. An unknown key name is rejected and leaves
    /// any existing binding in place.
    pub fn bind<F>(&self, key: &str, callback: F, toggle: bool) -> Result<()>
    where
        F: Fn() + Send + Sync + 'static,
    {
        if is_blank(key) {
            debug!("ignoring hotkey bind for blank key");
            return Ok(());
        }
        parse_key(key)?;
        let name = normalize_key(key);

        let mut watchers = self.lock();
        if let Some(previous) = watchers.remove(&name) {
            previous.stop();
        }
        let watcher = HotkeyWatcher::start(&name, self.input.clone(), Arc::new(callback), toggle)?;
        watchers.insert(name.clone(), watcher);

        debug!(key = %name, toggle, "hotkey bound");
        Ok(())
    }

    /// Stop watching `key`. Unbound keys are ignored.
    pub fn unbind(&self, key: &str) {
        let name = normalize_key(key);
        if let Some(watcher) = self.lock().remove(&name) {
            watcher.stop();
            debug!(key = %watcher.key(), "hotkey unbound");
        }
    }

    /// True while a live watcher polls `key`.
    pub fn is_bound(&self, key: &str) -> bool {
        self.lock()
            .get(&normalize_key(key))
            .is_some_and(HotkeyWatcher::is_running)
    }

    /// Names of keys with a live watcher, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .lock()
            .values()
            .filter(|watcher| watcher.is_running())
            .map(|watcher| watcher.key().to_string())
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.lock().values().filter(|w| w.is_running()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn unbind_all(&self) {
        for (_, watcher) in self.lock().drain() {
            watcher.stop();
            debug!(key = %watcher.key(), "hotkey unbound");
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, HotkeyWatcher>> {
        self.watchers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for HotkeyRegistry {
    fn drop(&mut self) {
        self.unbind_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_detector_toggle() {
        let mut edge = EdgeDetector::new(true);
        let fired: Vec<bool> = [false, true, true, true, false, true, false]
            .into_iter()
            .map(|down| edge.observe(down))
            .collect();
        assert_eq!(fired, vec![false, true, false, false, false, true, false]);
        assert_eq!(edge.state(), KeyState::Up);
    }

    #[test]
    fn test_edge_detector_held() {
        let mut edge = EdgeDetector::new(false);
        let fired: Vec<bool> = [true, true, true, false, true]
            .into_iter()
            .map(|down| edge.observe(down))
            .collect();
        assert_eq!(fired, vec![true, true, true, false, true]);
        assert_eq!(edge.state(), KeyState::Down);
    }

    #[test]
    fn test_registry_ignores_blank_and_rejects_unknown() {
        let input: SharedInput = Arc::new(crate::input::mock::MockInput::new());
        let registry = HotkeyRegistry::new(input);

        registry.bind("", || {}, true).unwrap();
        registry.bind("   ", || {}, false).unwrap();
        assert!(registry.is_empty());

        assert!(registry.bind("not-a-key", || {}, true).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_normalizes_names() {
        let input: SharedInput = Arc::new(crate::input::mock::MockInput::new());
        let registry = HotkeyRegistry::new(input);

        registry.bind("G", || {}, true).unwrap();
        assert!(registry.is_bound("g"));
        registry.bind(" g ", || {}, false).unwrap();
        assert_eq!(registry.keys(), vec!["g".to_string()]);

        registry.unbind("G");
        assert!(registry.is_empty());
        registry.unbind("g");
    }

    #[test]
    fn test_watcher_that_fails_is_no_longer_bound() {
        let mock = Arc::new(crate::input::mock::MockInput::new());
        mock.set_operation_failing("is_key_down", true);
        let input: SharedInput = mock.clone();
        let registry = HotkeyRegistry::new(input);

        registry.bind("g", || {}, true).unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while registry.is_bound("g") && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!registry.is_bound("g"));
        assert!(registry.keys().is_empty());
        assert!(registry.is_empty());

        // Rebinding replaces the dead watcher.
        mock.set_operation_failing("is_key_down", false);
        registry.bind("g", || {}, true).unwrap();
        assert!(registry.is_bound("g"));
        assert_eq!(registry.keys(), vec!["g".to_string()]);
    }
}
