//! Action data model: which button, where, how often, click or hold.

use crate::error::{ClickerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Pointer button an action is directed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[serde(alias = "left")]
    Primary,
    #[serde(alias = "right")]
    Secondary,
    Middle,
}

impl FromStr for MouseButton {
    type Err = ClickerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" | "primary" => Ok(Self::Primary),
            "right" | "secondary" => Ok(Self::Secondary),
            "middle" => Ok(Self::Middle),
            _ => Err(ClickerError::invalid_button(s)),
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Primary => "left",
            Self::Secondary => "right",
            Self::Middle => "middle",
        };
        f.write_str(name)
    }
}

/// Whether a worker clicks repeatedly or holds the button until stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionMode {
    #[default]
    #[serde(alias = "click")]
    Repeat,
    Hold,
}

impl FromStr for ActionMode {
    type Err = ClickerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "click" | "repeat" => Ok(Self::Repeat),
            "hold" => Ok(Self::Hold),
            _ => Err(ClickerError::invalid_mode(s)),
        }
    }
}

/// Screen coordinates in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// Longest delay between two clicks. Slower rates are clamped to it.
pub const MAX_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Everything a worker needs to run one action. A worker takes its own
/// copy at launch, so later edits never reach a running worker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub rate_per_second: f64,
    pub button: MouseButton,
    /// Fixed target; `None` means "wherever the pointer is".
    pub position: Option<Point>,
    pub mode: ActionMode,
}

impl ActionSpec {
    pub fn new(rate_per_second: f64, button: MouseButton) -> Self {
        Self {
            rate_per_second,
            button,
            position: None,
            mode: ActionMode::Repeat,
        }
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_mode(mut self, mode: ActionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build a spec from a delay between clicks instead of a rate.
    pub fn from_interval(interval: Duration, button: MouseButton) -> Result<Self> {
        if interval.is_zero() {
            return Err(ClickerError::invalid_duration(
                format!("{interval:?}"),
                "click interval must be greater than zero",
            ));
        }
        Ok(Self::new(1.0 / interval.as_secs_f64(), button))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.rate_per_second.is_finite() || self.rate_per_second <= 0.0 {
            return Err(ClickerError::invalid_rate(self.rate_per_second));
        }
        Ok(())
    }

    /// Delay between two clicks, at most [`MAX_PERIOD`].
    pub fn period(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.rate_per_second)
            .map_or(MAX_PERIOD, |period| period.min(MAX_PERIOD))
    }
}
