//! Device change notifications using IMMNotificationClient.
//!
//! The COM callbacks arrive on an MMDevice worker thread. They hand the raw
//! event to a [`NotificationBridge`], which filters it down to an
//! [`AudioEvent`], queues it on a channel, and wakes the UI thread. Nothing
//! here enumerates devices or touches the registration API.

use super::device::{AudioEvent, DataFlow, DeviceRole, DeviceState};
use super::traits::EndpointNotificationSink;
use std::sync::mpsc::{Receiver, Sender};
use tracing::{debug, trace};

/// Wakes the consumer after an event was queued (e.g. posts a window message).
pub type Waker = Box<dyn Fn() + Send + Sync>;

/// Republishes native callbacks onto the application's event queue.
pub struct NotificationBridge {
    sender: Sender<AudioEvent>,
    waker: Option<Waker>,
}

impl NotificationBridge {
    /// Create a bridge that only queues events.
    pub fn new(sender: Sender<AudioEvent>) -> Self {
        Self {
            sender,
            waker: None,
        }
    }

    /// Create a bridge that queues events and then calls `waker`.
    pub fn with_waker(sender: Sender<AudioEvent>, waker: Waker) -> Self {
        Self {
            sender,
            waker: Some(waker),
        }
    }

    fn publish(&self, event: AudioEvent) {
        trace!(?event, "Queueing audio event");
        // A closed receiver means the app is shutting down.
        if self.sender.send(event).is_ok() {
            if let Some(waker) = &self.waker {
                waker();
            }
        }
    }
}

impl EndpointNotificationSink for NotificationBridge {
    fn device_state_changed(&self, device_id: &str, new_state: DeviceState) {
        debug!(device_id, ?new_state, "Endpoint state changed");
        self.publish(AudioEvent::DevicesChanged);
    }

    fn device_added(&self, device_id: &str) {
        debug!(device_id, "Endpoint added");
        self.publish(AudioEvent::DevicesChanged);
    }

    fn device_removed(&self, device_id: &str) {
        debug!(device_id, "Endpoint removed");
        self.publish(AudioEvent::DevicesChanged);
    }

    fn default_device_changed(&self, flow: DataFlow, role: DeviceRole, device_id: Option<&str>) {
        if flow != DataFlow::Render || !role.is_tracked() {
            trace!(?flow, %role, "Ignoring default change for untracked flow/role");
            return;
        }

        self.publish(AudioEvent::DefaultDeviceChanged {
            device_id: device_id.map(str::to_string),
        });
    }
}

/// Creates an event channel and returns both ends.
pub fn create_event_channel() -> (Sender<AudioEvent>, Receiver<AudioEvent>) {
    std::sync::mpsc::channel()
}

#[cfg(windows)]
pub use self::com::NotificationClient;

#[cfg(windows)]
mod com {
    use super::super::device::{DataFlow, DeviceRole, DeviceState};
    use super::super::traits::EndpointNotificationSink;
    use std::sync::Arc;
    use windows::core::{implement, PCWSTR};
    use windows::Win32::Media::Audio::{
        EDataFlow, ERole, IMMNotificationClient, IMMNotificationClient_Impl, DEVICE_STATE,
    };
    use windows::Win32::UI::Shell::PropertiesSystem::PROPERTYKEY;
    // Re-export windows_core so the implement macro can find it
    #[allow(unused_imports)]
    use windows_core;

    /// COM notification client forwarding every callback to a sink.
    #[implement(IMMNotificationClient)]
    pub struct NotificationClient {
        sink: Arc<dyn EndpointNotificationSink>,
    }

    impl NotificationClient {
        pub fn new(sink: Arc<dyn EndpointNotificationSink>) -> Self {
            Self { sink }
        }
    }

    fn device_id(pwstr: &PCWSTR) -> Option<String> {
        if pwstr.is_null() {
            return None;
        }
        unsafe { pwstr.to_string().ok() }
    }

    impl IMMNotificationClient_Impl for NotificationClient_Impl {
        fn OnDeviceStateChanged(
            &self,
            pwstrdeviceid: &PCWSTR,
            dwnewstate: DEVICE_STATE,
        ) -> windows::core::Result<()> {
            let id = device_id(pwstrdeviceid).unwrap_or_default();
            self.sink
                .device_state_changed(&id, DeviceState::from_raw(dwnewstate.0));
            Ok(())
        }

        fn OnDeviceAdded(&self, pwstrdeviceid: &PCWSTR) -> windows::core::Result<()> {
            let id = device_id(pwstrdeviceid).unwrap_or_default();
            self.sink.device_added(&id);
            Ok(())
        }

        fn OnDeviceRemoved(&self, pwstrdeviceid: &PCWSTR) -> windows::core::Result<()> {
            let id = device_id(pwstrdeviceid).unwrap_or_default();
            self.sink.device_removed(&id);
            Ok(())
        }

        fn OnDefaultDeviceChanged(
            &self,
            flow: EDataFlow,
            role: ERole,
            pwstrdefaultdeviceid: &PCWSTR,
        ) -> windows::core::Result<()> {
            let Some(role) = DeviceRole::from_raw(role.0) else {
                return Ok(());
            };
            let id = device_id(pwstrdefaultdeviceid);
            self.sink
                .default_device_changed(DataFlow::from_raw(flow.0), role, id.as_deref());
            Ok(())
        }

        fn OnPropertyValueChanged(
            &self,
            _pwstrdeviceid: &PCWSTR,
            _key: &PROPERTYKEY,
        ) -> windows::core::Result<()> {
            Ok(())
        }
    }
}
