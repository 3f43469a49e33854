//! HearHere - Library
//!
//! A system tray utility that cycles the Windows default playback device.
//!
//! ## Features
//!
//! - Cycle forward/backward through a user-ordered list of enabled devices
//! - Jump straight to the n-th enabled device from the tray menu
//! - Global hotkeys for next/previous device
//! - Automatic refresh on device hot-plug and default-device changes
//! - Start with Windows option

#[cfg(windows)]
pub mod app;
pub mod audio;
pub mod config;
pub mod hotkeys;
pub mod logging;
pub mod platform;
pub mod switcher;
pub mod ui;

#[cfg(windows)]
pub use app::AppState;
pub use audio::{AudioEndpoint, AudioError, AudioEvent, DeviceRole, NotificationBridge};
pub use config::{AppConfig, ConfigStore};
pub use hotkeys::{HotkeyAction, HotkeyBinding};
pub use switcher::{Direction, SwitchEngine};

#[cfg(feature = "test-mocks")]
pub use audio::mocks::FakeAudioSystem;
