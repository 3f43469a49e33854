//! Global hotkeys.
//!
//! [`HotkeyBinding`] is the persisted key combination; on Windows the
//! [`HotkeyManager`] registers bindings with `RegisterHotKey` and resolves
//! `WM_HOTKEY` ids back to actions.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// RegisterHotKey modifier bits
pub const MOD_ALT: u32 = 0x0001;
pub const MOD_CONTROL: u32 = 0x0002;
pub const MOD_SHIFT: u32 = 0x0004;
pub const MOD_WIN: u32 = 0x0008;
pub const MOD_NOREPEAT: u32 = 0x4000;

/// A key combination. An empty `key` means the action is unbound.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyBinding {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub win: bool,
    pub key: String,
}

impl HotkeyBinding {
    pub fn new(ctrl: bool, alt: bool, shift: bool, key: &str) -> Self {
        Self {
            ctrl,
            alt,
            shift,
            win: false,
            key: key.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.key.trim().is_empty()
    }

    /// `MOD_*` flags for RegisterHotKey; auto-repeat is always suppressed.
    pub fn modifier_flags(&self) -> u32 {
        let mut flags = MOD_NOREPEAT;
        if self.alt {
            flags |= MOD_ALT;
        }
        if self.ctrl {
            flags |= MOD_CONTROL;
        }
        if self.shift {
            flags |= MOD_SHIFT;
        }
        if self.win {
            flags |= MOD_WIN;
        }
        flags
    }

    /// Win32 virtual-key code for `key`, or `None` if the name is unknown.
    pub fn virtual_key(&self) -> Option<u32> {
        let key = self.key.trim().to_ascii_uppercase();

        if key.len() == 1 {
            let c = key.chars().next()?;
            if c.is_ascii_uppercase() || c.is_ascii_digit() {
                return Some(c as u32);
            }
        }

        if let Some(n) = key.strip_prefix('F').and_then(|n| n.parse::<u32>().ok()) {
            return (1..=24).contains(&n).then(|| 0x6F + n);
        }

        if let Some(n) = key.strip_prefix("NUMPAD").and_then(|n| n.parse::<u32>().ok()) {
            return (n <= 9).then(|| 0x60 + n);
        }

        let vk = match key.as_str() {
            "TAB" => 0x09,
            "PAUSE" => 0x13,
            "SPACE" => 0x20,
            "PAGEUP" => 0x21,
            "PAGEDOWN" => 0x22,
            "END" => 0x23,
            "HOME" => 0x24,
            "LEFT" => 0x25,
            "UP" => 0x26,
            "RIGHT" => 0x27,
            "DOWN" => 0x28,
            "INSERT" => 0x2D,
            "DELETE" => 0x2E,
            _ => return None,
        };
        Some(vk)
    }
}

impl fmt::Display for HotkeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.alt {
            parts.push("Alt");
        }
        if self.shift {
            parts.push("Shift");
        }
        if self.win {
            parts.push("Win");
        }
        if !self.is_empty() {
            parts.push(self.key.trim());
        }
        f.write_str(&parts.join(" + "))
    }
}

/// What a registered hotkey does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    SwitchNext,
    SwitchPrevious,
}

/// Hotkey error types.
#[derive(Debug, Error)]
pub enum HotkeyError {
    #[error("Unknown key name: {0}")]
    UnknownKey(String),

    #[error("Failed to register hotkey {binding}: {reason}")]
    RegistrationFailed { binding: String, reason: String },
}

#[cfg(windows)]
pub use self::manager::HotkeyManager;

#[cfg(windows)]
mod manager {
    use super::{HotkeyAction, HotkeyBinding, HotkeyError};
    use std::collections::HashMap;
    use tracing::{info, warn};
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS,
    };

    /// Registers global hotkeys against a window and maps WM_HOTKEY ids to actions.
    pub struct HotkeyManager {
        hwnd: HWND,
        handlers: HashMap<i32, HotkeyAction>,
        next_id: i32,
    }

    impl HotkeyManager {
        pub fn new(hwnd: HWND) -> Self {
            Self {
                hwnd,
                handlers: HashMap::new(),
                next_id: 1,
            }
        }

        /// Register `binding`. Unbound bindings are skipped and return `Ok(None)`.
        pub fn register(
            &mut self,
            binding: &HotkeyBinding,
            action: HotkeyAction,
        ) -> Result<Option<i32>, HotkeyError> {
            if binding.is_empty() {
                return Ok(None);
            }

            let vk = binding
                .virtual_key()
                .ok_or_else(|| HotkeyError::UnknownKey(binding.key.clone()))?;

            let id = self.next_id;
            self.next_id += 1;

            unsafe {
                RegisterHotKey(self.hwnd, id, HOT_KEY_MODIFIERS(binding.modifier_flags()), vk)
            }
            .map_err(|e| {
                warn!(id, %binding, error = %e, "RegisterHotKey failed");
                HotkeyError::RegistrationFailed {
                    binding: binding.to_string(),
                    reason: e.to_string(),
                }
            })?;

            self.handlers.insert(id, action);
            info!(id, %binding, ?action, "Hotkey registered");
            Ok(Some(id))
        }

        /// Action bound to a WM_HOTKEY id.
        pub fn action_for(&self, id: i32) -> Option<HotkeyAction> {
            self.handlers.get(&id).copied()
        }

        pub fn unregister_all(&mut self) {
            for id in self.handlers.keys() {
                unsafe {
                    let _ = UnregisterHotKey(self.hwnd, *id);
                }
            }
            self.handlers.clear();
            self.next_id = 1;
        }
    }

    impl Drop for HotkeyManager {
        fn drop(&mut self) {
            self.unregister_all();
        }
    }
}
