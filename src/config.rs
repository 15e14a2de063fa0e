//! Configuration loading and validation.
//!
//! Settings come from an optional JSON file and are then overridden by
//! command-line flags. They are only ever read, never written back.

use crate::action::{ActionMode, ActionSpec, MouseButton, Point};
use crate::error::{ClickerError, Result};
use crate::input::keys::{is_blank, normalize_key, parse_key};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Clicks per second.
    #[serde(default = "default_rate")]
    pub rate: f64,

    /// Delay between clicks. Takes precedence over `rate` when set.
    #[serde(default, deserialize_with = "deserialize_optional_duration")]
    pub interval: Option<Duration>,

    #[serde(default = "default_button")]
    pub button: MouseButton,

    #[serde(default)]
    pub mode: ActionMode,

    /// Fixed click target. Absent means the live pointer position.
    #[serde(default)]
    pub position: Option<Point>,

    #[serde(default = "default_start_hotkey")]
    pub start_hotkey: String,

    #[serde(default = "default_stop_hotkey")]
    pub stop_hotkey: String,

    #[serde(default = "default_toggle_hotkey")]
    pub toggle_hotkey: String,

    /// Keep sampling the pointer while idle, for picking a fixed position.
    #[serde(default)]
    pub track_position: bool,

    #[serde(default)]
    pub verbose: bool,
}

/// Start, stop and toggle key names. An empty name leaves that action unbound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hotkeys {
    pub start: String,
    pub stop: String,
    pub toggle: String,
}

impl Hotkeys {
    pub fn new(
        start: impl Into<String>,
        stop: impl Into<String>,
        toggle: impl Into<String>,
    ) -> Self {
        Self {
            start: start.into(),
            stop: stop.into(),
            toggle: toggle.into(),
        }
    }

    fn named(&self) -> [(&'static str, &str); 3] {
        [
            ("start_hotkey", &self.start),
            ("stop_hotkey", &self.stop),
            ("toggle_hotkey", &self.toggle),
        ]
    }

    pub fn validate(&self) -> Result<()> {
        let named = self.named();
        for (field, key) in named {
            if !is_blank(key) {
                parse_key(key)
                    .map_err(|e| ClickerError::config_validation(format!("{field}: {e}")))?;
            }
        }
        for (i, (field, key)) in named.iter().enumerate() {
            if is_blank(key) {
                continue;
            }
            for (other, other_key) in &named[i + 1..] {
                if normalize_key(key) == normalize_key(other_key) {
                    return Err(ClickerError::config_validation(format!(
                        "{field} and {other} are both bound to '{}'",
                        normalize_key(key)
                    )));
                }
            }
        }
        Ok(())
    }
}

fn default_rate() -> f64 {
    1.0
}

fn default_button() -> MouseButton {
    MouseButton::Primary
}

fn default_start_hotkey() -> String {
    "g".to_string()
}

fn default_stop_hotkey() -> String {
    "h".to_string()
}

fn default_toggle_hotkey() -> String {
    "j".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rate: default_rate(),
            interval: None,
            button: default_button(),
            mode: ActionMode::default(),
            position: None,
            start_hotkey: default_start_hotkey(),
            stop_hotkey: default_stop_hotkey(),
            toggle_hotkey: default_toggle_hotkey(),
            track_position: false,
            verbose: false,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| ClickerError::config_load(path, e.to_string()))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ClickerError::config_load(path, e.to_string()))?;
        info!(path, "loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(interval) = self.interval {
            if interval.is_zero() {
                return Err(ClickerError::config_validation(
                    "interval must be greater than zero",
                ));
            }
        } else if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(ClickerError::config_validation(format!(
                "rate must be greater than zero, got {}",
                self.rate
            )));
        }
        self.hotkeys().validate()
    }

    /// The action this config describes. `interval`, when set, wins over `rate`.
    pub fn action_spec(&self) -> Result<ActionSpec> {
        let spec = match self.interval {
            Some(interval) => ActionSpec::from_interval(interval, self.button)?,
            None => ActionSpec::new(self.rate, self.button),
        };
        let spec = ActionSpec {
            position: self.position,
            mode: self.mode,
            ..spec
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn hotkeys(&self) -> Hotkeys {
        Hotkeys::new(
            self.start_hotkey.clone(),
            self.stop_hotkey.clone(),
            self.toggle_hotkey.clone(),
        )
    }
}

/// Parse a duration such as `"250ms"`, `"2s"`, `"1m"` or bare milliseconds.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let trimmed = value.trim().to_lowercase();
    if trimmed.is_empty() {
        return Err(ClickerError::invalid_duration(value, "empty duration"));
    }

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);
    if digits.is_empty() {
        return Err(ClickerError::invalid_duration(
            value,
            "expected a non-negative whole number",
        ));
    }
    let amount: u64 = digits
        .parse()
        .map_err(|_| ClickerError::invalid_duration(value, "number out of range"))?;

    match unit.trim() {
        "" | "ms" => Ok(Duration::from_millis(amount)),
        "s" => Ok(Duration::from_secs(amount)),
        "m" => amount
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| ClickerError::invalid_duration(value, "number out of range")),
        other => Err(ClickerError::invalid_duration(
            value,
            format!("unknown unit '{other}'"),
        )),
    }
}

fn deserialize_optional_duration<'de, D>(deserializer: D) -> std::result::Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Millis(u64),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Millis(ms)) => Ok(Some(Duration::from_millis(ms))),
        Some(Raw::Text(text)) => parse_duration(&text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
