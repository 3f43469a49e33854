//! Test utility builders for fake audio systems and enabled lists
//!
//! Individual helpers may not be used by all tests, so dead code warnings are suppressed.

#![allow(dead_code)]

use hear_here::audio::DeviceRole;
use hear_here::FakeAudioSystem;

/// Enabled device list from string literals.
pub fn enabled(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

/// Builder for a [`FakeAudioSystem`] in a known state.
pub struct AudioSystemBuilder {
    endpoints: Vec<(String, String)>,
    default_id: Option<String>,
    failing_roles: Vec<(DeviceRole, i32)>,
    enumeration_failure: bool,
}

impl AudioSystemBuilder {
    pub fn new() -> Self {
        Self {
            endpoints: Vec::new(),
            default_id: None,
            failing_roles: Vec::new(),
            enumeration_failure: false,
        }
    }

    /// Active endpoint whose display name is the upper-cased id.
    pub fn endpoint(mut self, id: &str) -> Self {
        self.endpoints.push((id.to_string(), id.to_uppercase()));
        self
    }

    pub fn named_endpoint(mut self, id: &str, name: &str) -> Self {
        self.endpoints.push((id.to_string(), name.to_string()));
        self
    }

    pub fn default_device(mut self, id: &str) -> Self {
        self.default_id = Some(id.to_string());
        self
    }

    pub fn failing_role(mut self, role: DeviceRole, hresult: u32) -> Self {
        self.failing_roles.push((role, hresult as i32));
        self
    }

    pub fn enumeration_failure(mut self) -> Self {
        self.enumeration_failure = true;
        self
    }

    pub fn build(self) -> FakeAudioSystem {
        let system = FakeAudioSystem::new();
        for (id, name) in &self.endpoints {
            system.add_endpoint(id, name);
        }
        system.set_current_default(self.default_id.as_deref());
        for (role, hresult) in self.failing_roles {
            system.fail_role(role, hresult);
        }
        system.set_enumeration_failure(self.enumeration_failure);
        system
    }
}

impl Default for AudioSystemBuilder {
    fn default() -> Self {
        Self::new()
    }
}
