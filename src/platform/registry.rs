//! "Start with Windows" registration in the HKCU Run key.

use thiserror::Error;
use tracing::{debug, info};
use windows::core::PCWSTR;
use windows::Win32::System::Registry::{
    RegCloseKey, RegDeleteValueW, RegOpenKeyExW, RegQueryValueExW, RegSetValueExW, HKEY,
    HKEY_CURRENT_USER, KEY_READ, KEY_WRITE, REG_SZ,
};

/// Preferences service error types.
#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("Failed to access registry: {0}")]
    RegistryAccess(String),

    #[error("Failed to write preference: {key}")]
    WriteFailed { key: String },
}

/// Manages the `HearHere` value under the Run key.
pub struct StartupRegistration {
    run_key_path: Vec<u16>,
    value_name: Vec<u16>,
}

impl StartupRegistration {
    const RUN_KEY: &'static str = r"Software\Microsoft\Windows\CurrentVersion\Run";
    const APP_NAME: &'static str = "HearHere";

    pub fn new() -> Self {
        Self {
            run_key_path: Self::to_wide(Self::RUN_KEY),
            value_name: Self::to_wide(Self::APP_NAME),
        }
    }

    fn to_wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    /// Check if "Start with Windows" is enabled.
    pub fn is_enabled(&self) -> bool {
        unsafe {
            let mut hkey = HKEY::default();
            let result = RegOpenKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(self.run_key_path.as_ptr()),
                0,
                KEY_READ,
                &mut hkey,
            );

            if result.is_err() {
                return false;
            }

            let mut data_size = 0u32;
            let result = RegQueryValueExW(
                hkey,
                PCWSTR::from_raw(self.value_name.as_ptr()),
                None,
                None,
                None,
                Some(&mut data_size),
            );

            let _ = RegCloseKey(hkey);

            result.is_ok() && data_size > 0
        }
    }

    /// Enable or disable "Start with Windows".
    pub fn set_enabled(&self, enabled: bool) -> Result<(), PreferencesError> {
        let exe_path_wide = if enabled {
            let exe_path = std::env::current_exe().map_err(|_| PreferencesError::WriteFailed {
                key: Self::APP_NAME.to_string(),
            })?;
            // Quoted so paths with spaces survive the Run key parser
            Some(Self::to_wide(&format!("\"{}\"", exe_path.to_string_lossy())))
        } else {
            None
        };

        unsafe {
            let mut hkey = HKEY::default();
            let result = RegOpenKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(self.run_key_path.as_ptr()),
                0,
                KEY_WRITE,
                &mut hkey,
            );

            if result.is_err() {
                return Err(PreferencesError::RegistryAccess(
                    "Failed to open Run key".to_string(),
                ));
            }

            let result = match &exe_path_wide {
                Some(path) => RegSetValueExW(
                    hkey,
                    PCWSTR::from_raw(self.value_name.as_ptr()),
                    0,
                    REG_SZ,
                    Some(std::slice::from_raw_parts(
                        path.as_ptr() as *const u8,
                        path.len() * 2,
                    )),
                ),
                None => RegDeleteValueW(hkey, PCWSTR::from_raw(self.value_name.as_ptr())),
            };

            let _ = RegCloseKey(hkey);

            // Deleting a value that was never there is fine.
            if result.is_err() && enabled {
                return Err(PreferencesError::WriteFailed {
                    key: Self::APP_NAME.to_string(),
                });
            }
        }

        if enabled {
            info!("Registered to start with Windows");
        } else {
            debug!("Removed start with Windows registration");
        }
        Ok(())
    }
}

impl Default for StartupRegistration {
    fn default() -> Self {
        Self::new()
    }
}
