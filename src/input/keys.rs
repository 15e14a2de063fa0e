//! Key identifier parsing.
//!
//! Hotkeys are configured as short names ("g", "f6", "space"). They are
//! resolved to a physical key [`Code`] so bad names are rejected when a
//! binding is made instead of silently never firing.

use crate::error::{ClickerError, Result};
use global_hotkey::hotkey::Code;

/// Lowercased, trimmed form used as the registry key.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// True if the identifier names no key at all.
pub fn is_blank(key: &str) -> bool {
    key.trim().is_empty()
}

pub fn parse_key(key: &str) -> Result<Code> {
    let name = normalize_key(key);
    if name.is_empty() {
        return Err(ClickerError::invalid_key(key, "empty key name"));
    }

    if let Some(code) = single_char(&name) {
        return Ok(code);
    }
    if let Some(code) = function_key(&name) {
        return Ok(code);
    }

    let code = match name.as_str() {
        "space" | "spacebar" => Code::Space,
        "enter" | "return" => Code::Enter,
        "tab" => Code::Tab,
        "escape" | "esc" => Code::Escape,
        "backspace" => Code::Backspace,
        "delete" | "del" => Code::Delete,
        "insert" | "ins" => Code::Insert,
        "home" => Code::Home,
        "end" => Code::End,
        "pageup" | "page up" => Code::PageUp,
        "pagedown" | "page down" => Code::PageDown,
        "up" | "arrowup" => Code::ArrowUp,
        "down" | "arrowdown" => Code::ArrowDown,
        "left" | "arrowleft" => Code::ArrowLeft,
        "right" | "arrowright" => Code::ArrowRight,
        "shift" => Code::ShiftLeft,
        "ctrl" | "control" => Code::ControlLeft,
        "alt" => Code::AltLeft,
        _ => return Err(ClickerError::invalid_key(key, "unsupported key name")),
    };
    Ok(code)
}

fn single_char(name: &str) -> Option<Code> {
    let mut chars = name.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let code = match c {
        'a' => Code::KeyA,
        'b' => Code::KeyB,
        'c' => Code::KeyC,
        'd' => Code::KeyD,
        'e' => Code::KeyE,
        'f' => Code::KeyF,
        'g' => Code::KeyG,
        'h' => Code::KeyH,
        'i' => Code::KeyI,
        'j' => Code::KeyJ,
        'k' => Code::KeyK,
        'l' => Code::KeyL,
        'm' => Code::KeyM,
        'n' => Code::KeyN,
        'o' => Code::KeyO,
        'p' => Code::KeyP,
        'q' => Code::KeyQ,
        'r' => Code::KeyR,
        's' => Code::KeyS,
        't' => Code::KeyT,
        'u' => Code::KeyU,
        'v' => Code::KeyV,
        'w' => Code::KeyW,
        'x' => Code::KeyX,
        'y' => Code::KeyY,
        'z' => Code::KeyZ,
        '0' => Code::Digit0,
        '1' => Code::Digit1,
        '2' => Code::Digit2,
        '3' => Code::Digit3,
        '4' => Code::Digit4,
        '5' => Code::Digit5,
        '6' => Code::Digit6,
        '7' => Code::Digit7,
        '8' => Code::Digit8,
        '9' => Code::Digit9,
        '-' => Code::Minus,
        '=' => Code::Equal,
        ',' => Code::Comma,
        '.' => Code::Period,
        '/' => Code::Slash,
        ';' => Code::Semicolon,
        '\'' => Code::Quote,
        '[' => Code::BracketLeft,
        ']' => Code::BracketRight,
        '\\' => Code::Backslash,
        '`' => Code::Backquote,
        _ => return None,
    };
    Some(code)
}

fn function_key(name: &str) -> Option<Code> {
    let n: u8 = name.strip_prefix('f')?.parse().ok()?;
    let code = match n {
        1 => Code::F1,
        2 => Code::F2,
        3 => Code::F3,
        4 => Code::F4,
        5 => Code::F5,
        6 => Code::F6,
        7 => Code::F7,
        8 => Code::F8,
        9 => Code::F9,
        10 => Code::F10,
        11 => Code::F11,
        12 => Code::F12,
        _ => return None,
    };
    Some(code)
}
