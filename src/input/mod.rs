//! Boundary to the platform's pointer injection and key-state query.
//!
//! Workers only ever talk to an [`InputCapability`]. The platform
//! implementation is selected at compile time via `#[cfg(...)]`; the
//! [`mock::MockInput`] backend records every call for tests.

use crate::action::{MouseButton, Point};
use crate::error::Result;
use std::sync::Arc;

pub mod keys;
pub mod mock;

#[cfg(windows)]
pub mod windows;

/// Pointer injection and key-state query, implemented per platform.
///
/// Implementations are called from several worker threads at once and must
/// not block for longer than a single OS call.
pub trait InputCapability: Send + Sync {
    /// Move to `at` and perform a full press followed by a release.
    fn click(&self, button: MouseButton, at: Point) -> Result<()>;

    /// Move to `at` and put the button down.
    fn press(&self, button: MouseButton, at: Point) -> Result<()>;

    /// Move to `at` and let the button up.
    fn release(&self, button: MouseButton, at: Point) -> Result<()>;

    fn query_position(&self) -> Result<Point>;

    /// Whether the named key is physically down right now.
    fn is_key_down(&self, key: &str) -> Result<bool>;
}

/// Shared handle to a backend, cloned into every worker.
pub type SharedInput = Arc<dyn InputCapability>;

/// The input backend for the platform this binary was built for.
#[cfg(windows)]
pub fn default_backend() -> Result<SharedInput> {
    Ok(Arc::new(windows::WinapiInput::new()))
}

/// The input backend for the platform this binary was built for.
#[cfg(not(windows))]
pub fn default_backend() -> Result<SharedInput> {
    Err(crate::error::ClickerError::unsupported_platform(format!(
        "no pointer injection backend for {}",
        std::env::consts::OS
    )))
}
