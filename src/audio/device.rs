//! Audio endpoint data models.
//!
//! Defines the value types handed out by the endpoint directory, the
//! role/state enums mirrored from the Windows MMDevice API, the events the
//! notification bridge publishes, and the audio error taxonomy.

use std::fmt;
use thiserror::Error;

/// A playback endpoint as seen in one enumeration snapshot.
///
/// Built fresh on every enumeration and never mutated afterwards; only `id`
/// is ever persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioEndpoint {
    /// Opaque Windows endpoint ID (from IMMDevice::GetId), compared by exact equality
    pub id: String,

    /// Human-readable device name (may repeat across endpoints)
    pub display_name: String,

    /// Whether this is the default endpoint for the Multimedia role at snapshot time
    pub is_current_default: bool,
}

impl AudioEndpoint {
    /// Create a new, non-default endpoint.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            is_current_default: false,
        }
    }

    /// Mark whether this endpoint is the current default.
    pub fn with_default(mut self, is_current_default: bool) -> Self {
        self.is_current_default = is_current_default;
        self
    }
}

impl fmt::Display for AudioEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

/// Audio device role (maps to Windows ERole enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DeviceRole {
    /// Used by games, system sounds, most general applications
    Console = 0,

    /// Used by music players, video players
    Multimedia = 1,

    /// Used by Teams, Zoom, Discord, and other VoIP applications
    Communications = 2,
}

impl DeviceRole {
    /// Every role, in the order the controller sets them.
    pub const ALL: [DeviceRole; 3] = [
        DeviceRole::Console,
        DeviceRole::Multimedia,
        DeviceRole::Communications,
    ];

    /// Map a raw ERole value; unknown values yield `None`.
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(DeviceRole::Console),
            1 => Some(DeviceRole::Multimedia),
            2 => Some(DeviceRole::Communications),
            _ => None,
        }
    }

    /// The role this application tracks as "the" default.
    pub fn is_tracked(self) -> bool {
        self == DeviceRole::Multimedia
    }
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceRole::Console => f.write_str("console"),
            DeviceRole::Multimedia => f.write_str("multimedia"),
            DeviceRole::Communications => f.write_str("communications"),
        }
    }
}

/// Direction of audio data for an endpoint (maps to Windows EDataFlow enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFlow {
    /// Playback endpoints
    Render,

    /// Recording endpoints
    Capture,

    /// Anything else the platform reports (eAll)
    Other,
}

impl DataFlow {
    /// Map a raw EDataFlow value.
    pub fn from_raw(value: i32) -> Self {
        match value {
            0 => DataFlow::Render,
            1 => DataFlow::Capture,
            _ => DataFlow::Other,
        }
    }
}

/// Windows device state flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Device is active and available for use
    Active,

    /// Device is disabled in Windows Sound settings
    Disabled,

    /// Device is not present (driver issue)
    NotPresent,

    /// Device is unplugged (for pluggable devices)
    Unplugged,
}

impl DeviceState {
    /// Map a raw DEVICE_STATE_* value; unknown bits count as not present.
    pub fn from_raw(value: u32) -> Self {
        match value {
            1 => DeviceState::Active,
            2 => DeviceState::Disabled,
            8 => DeviceState::Unplugged,
            _ => DeviceState::NotPresent,
        }
    }
}

/// Coarse events republished to the rest of the application.
///
/// Consumers must re-query current state instead of trusting the payload;
/// delivery order between the two kinds is not guaranteed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    /// An endpoint was added, removed, or changed state
    DevicesChanged,

    /// The Multimedia-role default playback endpoint changed; `None` when
    /// no default is left
    DefaultDeviceChanged { device_id: Option<String> },
}

/// Outcome of one role-specific SetDefaultEndpoint call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleStatus {
    Succeeded,
    Failed { hresult: i32 },
}

impl RoleStatus {
    /// Build from a raw HRESULT (negative values are failures).
    pub fn from_hresult(hresult: i32) -> Self {
        if hresult < 0 {
            RoleStatus::Failed { hresult }
        } else {
            RoleStatus::Succeeded
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RoleStatus::Succeeded)
    }

    fn hresult(&self) -> i32 {
        match self {
            RoleStatus::Succeeded => 0,
            RoleStatus::Failed { hresult } => *hresult,
        }
    }
}

/// Per-role results of a set-default attempt. Every role is always attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleResults {
    pub console: RoleStatus,
    pub multimedia: RoleStatus,
    pub communications: RoleStatus,
}

impl RoleResults {
    /// All roles succeeded.
    pub fn succeeded() -> Self {
        Self {
            console: RoleStatus::Succeeded,
            multimedia: RoleStatus::Succeeded,
            communications: RoleStatus::Succeeded,
        }
    }

    /// Status for a single role.
    pub fn get(&self, role: DeviceRole) -> RoleStatus {
        match role {
            DeviceRole::Console => self.console,
            DeviceRole::Multimedia => self.multimedia,
            DeviceRole::Communications => self.communications,
        }
    }

    /// Record the status for a single role.
    pub fn set(&mut self, role: DeviceRole, status: RoleStatus) {
        match role {
            DeviceRole::Console => self.console = status,
            DeviceRole::Multimedia => self.multimedia = status,
            DeviceRole::Communications => self.communications = status,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        DeviceRole::ALL.iter().all(|role| self.get(*role).is_success())
    }

    /// The Multimedia role governs what the user hears and sees as default.
    pub fn multimedia_succeeded(&self) -> bool {
        self.multimedia.is_success()
    }
}

impl fmt::Display for RoleResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "console=0x{:08X} multimedia=0x{:08X} communications=0x{:08X}",
            self.console.hresult(),
            self.multimedia.hresult(),
            self.communications.hresult()
        )
    }
}

/// Audio service error types.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("COM initialization failed: {0}")]
    ComInitFailed(String),

    #[error("Audio endpoint directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("String conversion error: {0}")]
    StringConversion(String),

    #[error("Failed to set default device {endpoint_id} ({roles})")]
    SetDefaultFailed {
        endpoint_id: String,
        roles: RoleResults,
    },
}
