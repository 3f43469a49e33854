//! Seams between the switching logic and the Windows audio stack.

use super::device::{AudioEndpoint, AudioError, DataFlow, DeviceRole, DeviceState};

/// Pull side of the endpoint directory.
pub trait EndpointDirectory {
    /// All playback endpoints in the Active state, with `is_current_default`
    /// computed against the Multimedia-role default at call time.
    fn list_active_endpoints(&self) -> Result<Vec<AudioEndpoint>, AudioError>;

    /// ID of the Multimedia-role default playback endpoint. `None` is a
    /// normal state (no audio hardware, nothing selected).
    fn current_default_id(&self) -> Option<String>;
}

/// Sets the default playback endpoint.
pub trait DefaultEndpointController {
    /// Attempt every role (console, multimedia, communications) without
    /// short-circuiting. Any failed role yields `AudioError::SetDefaultFailed`
    /// carrying the status of all three.
    fn set_default(&self, endpoint_id: &str) -> Result<(), AudioError>;
}

/// Push side of the endpoint directory: one method per native event kind.
///
/// Implementations run on a platform thread and must return quickly without
/// calling back into the directory or its registration API.
pub trait EndpointNotificationSink: Send + Sync {
    fn device_state_changed(&self, device_id: &str, new_state: DeviceState);

    fn device_added(&self, device_id: &str);

    fn device_removed(&self, device_id: &str);

    fn default_device_changed(&self, flow: DataFlow, role: DeviceRole, device_id: Option<&str>);
}

impl<T: EndpointDirectory + ?Sized> EndpointDirectory for &T {
    fn list_active_endpoints(&self) -> Result<Vec<AudioEndpoint>, AudioError> {
        (**self).list_active_endpoints()
    }

    fn current_default_id(&self) -> Option<String> {
        (**self).current_default_id()
    }
}

impl<T: DefaultEndpointController + ?Sized> DefaultEndpointController for &T {
    fn set_default(&self, endpoint_id: &str) -> Result<(), AudioError> {
        (**self).set_default(endpoint_id)
    }
}
