//! UI module for the system tray.
//!
//! The menu layout is plain data; only the tray itself needs Windows.

pub mod menu;
#[cfg(windows)]
pub mod tray;

pub use menu::{build_menu_model, tooltip_text, MenuEntry, TrayAction};
#[cfg(windows)]
pub use tray::{TrayError, TrayManager};
