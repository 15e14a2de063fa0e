//! Win32 input backend: `SetCursorPos` + `mouse_event` for injection,
//! `GetCursorPos` and `GetAsyncKeyState` for queries.

use crate::action::{MouseButton, Point};
use crate::error::{ClickerError, Result};
use crate::input::keys::parse_key;
use crate::input::InputCapability;
use global_hotkey::hotkey::Code;
use std::io;
use winapi::shared::windef::POINT;
use winapi::um::winuser::{
    mouse_event, GetAsyncKeyState, GetCursorPos, SetCursorPos, MOUSEEVENTF_LEFTDOWN,
    MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_RIGHTDOWN,
    MOUSEEVENTF_RIGHTUP,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct WinapiInput;

impl WinapiInput {
    pub fn new() -> Self {
        Self
    }

    fn move_to(&self, operation: &str, at: Point) -> Result<()> {
        // SAFETY: SetCursorPos takes plain integers and has no pointer arguments.
        let ok = unsafe { SetCursorPos(at.x, at.y) };
        if ok == 0 {
            return Err(ClickerError::capability(
                operation,
                io::Error::last_os_error().to_string(),
            ));
        }
        Ok(())
    }

    fn send(&self, flags: u32, at: Point) {
        // SAFETY: mouse_event only reads its integer arguments.
        unsafe { mouse_event(flags, at.x as u32, at.y as u32, 0, 0) };
    }
}

fn down_flag(button: MouseButton) -> u32 {
    match button {
        MouseButton::Primary => MOUSEEVENTF_LEFTDOWN,
        MouseButton::Secondary => MOUSEEVENTF_RIGHTDOWN,
        MouseButton::Middle => MOUSEEVENTF_MIDDLEDOWN,
    }
}

fn up_flag(button: MouseButton) -> u32 {
    match button {
        MouseButton::Primary => MOUSEEVENTF_LEFTUP,
        MouseButton::Secondary => MOUSEEVENTF_RIGHTUP,
        MouseButton::Middle => MOUSEEVENTF_MIDDLEUP,
    }
}

impl InputCapability for WinapiInput {
    fn click(&self, button: MouseButton, at: Point) -> Result<()> {
        self.move_to("click", at)?;
        self.send(down_flag(button), at);
        self.send(up_flag(button), at);
        Ok(())
    }

    fn press(&self, button: MouseButton, at: Point) -> Result<()> {
        self.move_to("press", at)?;
        self.send(down_flag(button), at);
        Ok(())
    }

    fn release(&self, button: MouseButton, at: Point) -> Result<()> {
        self.move_to("release", at)?;
        self.send(up_flag(button), at);
        Ok(())
    }

    fn query_position(&self) -> Result<Point> {
        let mut pt = POINT { x: 0, y: 0 };
        // SAFETY: `pt` is a valid, writable POINT for the duration of the call.
        let ok = unsafe { GetCursorPos(&mut pt) };
        if ok == 0 {
            return Err(ClickerError::capability(
                "query_position",
                io::Error::last_os_error().to_string(),
            ));
        }
        Ok(Point::new(pt.x, pt.y))
    }

    fn is_key_down(&self, key: &str) -> Result<bool> {
        let vk = virtual_key(parse_key(key)?)
            .ok_or_else(|| ClickerError::invalid_key(key, "no virtual-key code"))?;
        // SAFETY: GetAsyncKeyState takes a plain integer.
        let state = unsafe { GetAsyncKeyState(vk) };
        Ok((state as u16 & 0x8000) != 0)
    }
}

fn virtual_key(code: Code) -> Option<i32> {
    use winapi::um::winuser::*;

    let vk = match code {
        Code::KeyA => 0x41,
        Code::KeyB => 0x42,
        Code::KeyC => 0x43,
        Code::KeyD => 0x44,
        Code::KeyE => 0x45,
        Code::KeyF => 0x46,
        Code::KeyG => 0x47,
        Code::KeyH => 0x48,
        Code::KeyI => 0x49,
        Code::KeyJ => 0x4A,
        Code::KeyK => 0x4B,
        Code::KeyL => 0x4C,
        Code::KeyM => 0x4D,
        Code::KeyN => 0x4E,
        Code::KeyO => 0x4F,
        Code::KeyP => 0x50,
        Code::KeyQ => 0x51,
        Code::KeyR => 0x52,
        Code::KeyS => 0x53,
        Code::KeyT => 0x54,
        Code::KeyU => 0x55,
        Code::KeyV => 0x56,
        Code::KeyW => 0x57,
        Code::KeyX => 0x58,
        Code::KeyY => 0x59,
        Code::KeyZ => 0x5A,
        Code::Digit0 => 0x30,
        Code::Digit1 => 0x31,
        Code::Digit2 => 0x32,
        Code::Digit3 => 0x33,
        Code::Digit4 => 0x34,
        Code::Digit5 => 0x35,
        Code::Digit6 => 0x36,
        Code::Digit7 => 0x37,
        Code::Digit8 => 0x38,
        Code::Digit9 => 0x39,
        Code::F1 => VK_F1,
        Code::F2 => VK_F2,
        Code::F3 => VK_F3,
        Code::F4 => VK_F4,
        Code::F5 => VK_F5,
        Code::F6 => VK_F6,
        Code::F7 => VK_F7,
        Code::F8 => VK_F8,
        Code::F9 => VK_F9,
        Code::F10 => VK_F10,
        Code::F11 => VK_F11,
        Code::F12 => VK_F12,
        Code::Space => VK_SPACE,
        Code::Enter => VK_RETURN,
        Code::Tab => VK_TAB,
        Code::Escape => VK_ESCAPE,
        Code::Backspace => VK_BACK,
        Code::Delete => VK_DELETE,
        Code::Insert => VK_INSERT,
        Code::Home => VK_HOME,
        Code::End => VK_END,
        Code::PageUp => VK_PRIOR,
        Code::PageDown => VK_NEXT,
        Code::ArrowUp => VK_UP,
        Code::ArrowDown => VK_DOWN,
        Code::ArrowLeft => VK_LEFT,
        Code::ArrowRight => VK_RIGHT,
        Code::ShiftLeft => VK_SHIFT,
        Code::ControlLeft => VK_CONTROL,
        Code::AltLeft => VK_MENU,
        Code::Minus => VK_OEM_MINUS,
        Code::Equal => VK_OEM_PLUS,
        Code::Comma => VK_OEM_COMMA,
        Code::Period => VK_OEM_PERIOD,
        Code::Slash => VK_OEM_2,
        Code::Semicolon => VK_OEM_1,
        Code::Quote => VK_OEM_7,
        Code::BracketLeft => VK_OEM_4,
        Code::BracketRight => VK_OEM_6,
        Code::Backslash => VK_OEM_5,
        Code::Backquote => VK_OEM_3,
        _ => return None,
    };
    Some(vk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_parsed_key_has_a_virtual_key() {
        for name in ["a", "z", "0", "9", "f1", "f12", "space", "esc", "left", "ctrl", "/"] {
            let code = parse_key(name).unwrap();
            assert!(virtual_key(code).is_some(), "no vk for {name}");
        }
    }
}
