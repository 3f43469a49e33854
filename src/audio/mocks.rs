//! In-memory audio system for tests.
//!
//! One [`FakeAudioSystem`] plays both the endpoint directory and the default
//! endpoint controller. Clones share state, so a test can hand one clone to
//! the switch engine and keep another to inspect calls.

use super::device::{AudioEndpoint, AudioError, DeviceRole, RoleResults, RoleStatus};
use super::traits::{DefaultEndpointController, EndpointDirectory};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeState {
    endpoints: Vec<(String, String)>,
    default_id: Option<String>,
    failing_roles: Vec<(DeviceRole, i32)>,
    enumeration_failure: bool,
    set_default_calls: Vec<String>,
    enumeration_calls: usize,
}

/// Controllable directory + controller pair.
#[derive(Clone, Default)]
pub struct FakeAudioSystem {
    state: Arc<Mutex<FakeState>>,
}

impl FakeAudioSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a system with the given `(id, name)` endpoints all active.
    pub fn with_endpoints(endpoints: &[(&str, &str)]) -> Self {
        let system = Self::new();
        for (id, name) in endpoints {
            system.add_endpoint(id, name);
        }
        system
    }

    /// Plug in an active endpoint.
    pub fn add_endpoint(&self, id: &str, name: &str) {
        self.state
            .lock()
            .unwrap()
            .endpoints
            .push((id.to_string(), name.to_string()));
    }

    /// Unplug an endpoint. The default is left alone, like Windows does
    /// until it reassigns.
    pub fn remove_endpoint(&self, id: &str) {
        self.state
            .lock()
            .unwrap()
            .endpoints
            .retain(|(endpoint_id, _)| endpoint_id != id);
    }

    /// Force the Multimedia default to `id` (which need not be active).
    pub fn set_current_default(&self, id: Option<&str>) {
        self.state.lock().unwrap().default_id = id.map(str::to_string);
    }

    /// Make every SetDefaultEndpoint call for `role` return `hresult`.
    pub fn fail_role(&self, role: DeviceRole, hresult: i32) {
        self.state.lock().unwrap().failing_roles.push((role, hresult));
    }

    /// Make enumeration fail as if the MMDevice service were gone.
    pub fn set_enumeration_failure(&self, should_fail: bool) {
        self.state.lock().unwrap().enumeration_failure = should_fail;
    }

    /// IDs passed to `set_default`, oldest first.
    pub fn set_default_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().set_default_calls.clone()
    }

    /// Number of `list_active_endpoints` calls made so far.
    pub fn enumeration_calls(&self) -> usize {
        self.state.lock().unwrap().enumeration_calls
    }
}

impl EndpointDirectory for FakeAudioSystem {
    fn list_active_endpoints(&self) -> Result<Vec<AudioEndpoint>, AudioError> {
        let mut state = self.state.lock().unwrap();
        state.enumeration_calls += 1;
        if state.enumeration_failure {
            return Err(AudioError::DirectoryUnavailable(
                "fake enumeration failure".to_string(),
            ));
        }

        Ok(state
            .endpoints
            .iter()
            .map(|(id, name)| {
                AudioEndpoint::new(id.clone(), name.clone())
                    .with_default(state.default_id.as_deref() == Some(id.as_str()))
            })
            .collect())
    }

    fn current_default_id(&self) -> Option<String> {
        self.state.lock().unwrap().default_id.clone()
    }
}

impl DefaultEndpointController for FakeAudioSystem {
    fn set_default(&self, endpoint_id: &str) -> Result<(), AudioError> {
        let mut state = self.state.lock().unwrap();
        state.set_default_calls.push(endpoint_id.to_string());

        let present = state.endpoints.iter().any(|(id, _)| id == endpoint_id);
        let mut roles = RoleResults::succeeded();
        for role in DeviceRole::ALL {
            let status = if !present {
                // E_NOTFOUND, as returned for a device that vanished mid-switch
                RoleStatus::Failed {
                    hresult: 0x8007_0490_u32 as i32,
                }
            } else {
                state
                    .failing_roles
                    .iter()
                    .find(|(failing, _)| *failing == role)
                    .map(|(_, hresult)| RoleStatus::Failed { hresult: *hresult })
                    .unwrap_or(RoleStatus::Succeeded)
            };
            roles.set(role, status);
        }

        if roles.multimedia_succeeded() {
            state.default_id = Some(endpoint_id.to_string());
        }

        if roles.all_succeeded() {
            Ok(())
        } else {
            Err(AudioError::SetDefaultFailed {
                endpoint_id: endpoint_id.to_string(),
                roles,
            })
        }
    }
}
