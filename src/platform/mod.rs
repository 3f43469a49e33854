//! Platform-specific module for Windows utilities.
//!
//! This module contains the tray icon artwork and the registry-backed
//! "Start with Windows" switch.

pub mod icons;
#[cfg(windows)]
pub mod registry;

#[cfg(windows)]
pub use registry::{PreferencesError, StartupRegistration};
