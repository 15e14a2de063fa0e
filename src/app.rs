//! Headless controller tying the scheduler, hotkeys and position sampler
//! together. A front end (CLI or GUI) drives everything through
//! [`AutoClicker`].

use crate::action::{ActionSpec, Point};
use crate::clicker::ActionScheduler;
use crate::config::Hotkeys;
use crate::error::Result;
use crate::hotkey::HotkeyRegistry;
use crate::input::keys::{is_blank, normalize_key};
use crate::input::SharedInput;
use crate::sampler::{PositionSampler, SampledPosition};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HotkeyAction {
    Start,
    Stop,
    Toggle,
}

impl HotkeyAction {
    fn run(self, app: &AutoClicker) {
        let result = match self {
            Self::Start => app.start(),
            Self::Stop => {
                app.stop();
                Ok(())
            }
            Self::Toggle => app.toggle(),
        };
        if let Err(e) = result {
            warn!(action = ?self, error = %e, "hotkey action failed");
        }
    }
}

pub struct AutoClicker {
    scheduler: ActionScheduler,
    hotkeys: HotkeyRegistry,
    sampler: PositionSampler,
    spec: Mutex<ActionSpec>,
    assigned: Mutex<Hotkeys>,
    track_position: AtomicBool,
}

impl AutoClicker {
    /// Build an idle clicker. `on_position` receives pointer samples while
    /// position tracking is on and nothing is clicking.
    pub fn new<F>(input: SharedInput, spec: ActionSpec, on_position: F) -> Result<Arc<Self>>
    where
        F: FnMut(Point) + Send + 'static,
    {
        spec.validate()?;
        let sampler = PositionSampler::start_paused(input.clone(), on_position)?;
        Ok(Arc::new(Self {
            scheduler: ActionScheduler::new(input.clone()),
            hotkeys: HotkeyRegistry::new(input),
            sampler,
            spec: Mutex::new(spec),
            assigned: Mutex::new(Hotkeys::default()),
            track_position: AtomicBool::new(false),
        }))
    }

    /// Replace the action used by the next `start`. A running action keeps
    /// the settings it was started with.
    pub fn set_action(&self, spec: ActionSpec) -> Result<()> {
        spec.validate()?;
        *lock(&self.spec) = spec;
        Ok(())
    }

    pub fn action(&self) -> ActionSpec {
        *lock(&self.spec)
    }

    /// Begin clicking with the current action. Ignored while already clicking.
    pub fn start(&self) -> Result<()> {
        if self.is_clicking() {
            return Ok(());
        }
        self.sampler.pause();
        let spec = self.action();
        if let Err(e) = self.scheduler.start(spec) {
            self.resume_tracking();
            return Err(e);
        }
        Ok(())
    }

    pub fn stop(&self) {
        self.scheduler.stop();
        self.resume_tracking();
    }

    pub fn toggle(&self) -> Result<()> {
        if self.is_clicking() {
            self.stop();
            Ok(())
        } else {
            self.start()
        }
    }

    pub fn is_clicking(&self) -> bool {
        self.scheduler.is_active()
    }

    /// Bind start, stop and toggle keys. Only keys that differ from the
    /// current assignment are rebound; blank keys end up unbound.
    pub fn assign_hotkeys(self: &Arc<Self>, hotkeys: Hotkeys) -> Result<()> {
        hotkeys.validate()?;
        let mut assigned = lock(&self.assigned);

        let changes: Vec<_> = [
            (&assigned.start, &hotkeys.start, HotkeyAction::Start),
            (&assigned.stop, &hotkeys.stop, HotkeyAction::Stop),
            (&assigned.toggle, &hotkeys.toggle, HotkeyAction::Toggle),
        ]
        .into_iter()
        .filter(|(old, new, _)| normalize_key(old) != normalize_key(new))
        .collect();

        // Unbind everything first so a key moving between actions is not
        // torn down right after being rebound.
        for (old, _, _) in &changes {
            self.hotkeys.unbind(old);
        }
        for (_, new, action) in changes {
            if is_blank(new) {
                continue;
            }
            let app: Weak<Self> = Arc::downgrade(self);
            self.hotkeys.bind(
                new,
                move || {
                    if let Some(app) = app.upgrade() {
                        action.run(&app);
                    }
                },
                true,
            )?;
        }

        info!(
            start = %hotkeys.start,
            stop = %hotkeys.stop,
            toggle = %hotkeys.toggle,
            "hotkeys assigned"
        );
        *assigned = hotkeys;
        Ok(())
    }

    pub fn hotkeys(&self) -> Hotkeys {
        lock(&self.assigned).clone()
    }

    /// Keys currently being watched.
    pub fn bound_keys(&self) -> Vec<String> {
        self.hotkeys.keys()
    }

    /// Sample the pointer while idle, e.g. to pick a fixed click position.
    pub fn set_position_tracking(&self, enabled: bool) {
        self.track_position.store(enabled, Ordering::SeqCst);
        if enabled {
            self.resume_tracking();
        } else {
            self.sampler.pause();
        }
    }

    pub fn position(&self) -> SampledPosition {
        self.sampler.latest()
    }

    pub fn subscribe_position(&self) -> watch::Receiver<SampledPosition> {
        self.sampler.subscribe()
    }

    /// Stop clicking, drop every hotkey and retire the sampler.
    pub fn shutdown(&self) {
        self.scheduler.stop();
        self.hotkeys.unbind_all();
        self.sampler.stop();
        info!("auto clicker shut down");
    }

    fn resume_tracking(&self) {
        if self.track_position.load(Ordering::SeqCst) && !self.is_clicking() {
            self.sampler.unpause();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
