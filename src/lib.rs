//! # Auto Clicker
//!
//! Repeated pointer-button automation driven by global hotkeys.
//!
//! ## Features
//!
//! - Click any button repeatedly at a configurable rate, or hold it down
//!   until stopped
//! - Click at a fixed position or wherever the pointer currently is
//! - Start, stop and toggle hotkeys with edge-triggered detection
//! - Live pointer position sampling that can be paused in place
//! - JSON configuration file support
//!
//! Starting a new action always supersedes the previous one: at most one
//! click worker runs at a time.
//!
//! ## Example
//!
//! ```no_run
//! use auto_clicker::{input, ActionScheduler, ActionSpec, MouseButton};
//!
//! let backend = input::default_backend().unwrap();
//! let scheduler = ActionScheduler::new(backend);
//!
//! // Ten left clicks per second at the current pointer position.
//! scheduler.start(ActionSpec::new(10.0, MouseButton::Primary)).unwrap();
//! std::thread::sleep(std::time::Duration::from_secs(2));
//! scheduler.stop();
//! ```
//!
//! ## Configuration
//!
//! ```json
//! {
//!   "rate": 12.5,
//!   "button": "left",
//!   "mode": "click",
//!   "position": {"x": 640, "y": 480},
//!   "start_hotkey": "g",
//!   "stop_hotkey": "h",
//!   "toggle_hotkey": "j"
//! }
//! ```

pub mod action;
pub mod app;
pub mod clicker;
pub mod config;
pub mod error;
pub mod hotkey;
pub mod input;
pub mod sampler;
pub mod worker;

pub use action::{ActionMode, ActionSpec, MouseButton, Point};
pub use app::AutoClicker;
pub use clicker::{ActionScheduler, ActionWorker};
pub use config::{Config, Hotkeys};
pub use error::{ClickerError, Result};
pub use hotkey::{HotkeyRegistry, HotkeyWatcher};
pub use input::InputCapability;
pub use sampler::{PositionSampler, SampledPosition};
pub use worker::{CancelToken, WorkerHandle};
