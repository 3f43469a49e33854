//! Playback endpoint enumeration using Windows MMDevice API.
//!
//! Provides COM initialization and the [`EndpointDirectory`] implementation
//! backed by `IMMDeviceEnumerator`.

use super::device::{AudioEndpoint, AudioError};
use super::notifications::NotificationClient;
use super::traits::{EndpointDirectory, EndpointNotificationSink};
use std::sync::Arc;
use tracing::{debug, warn};
use windows::core::PWSTR;
use windows::Win32::Devices::Properties::DEVPKEY_Device_FriendlyName;
use windows::Win32::Media::Audio::{
    eMultimedia, eRender, IMMDevice, IMMDeviceEnumerator, IMMNotificationClient,
    MMDeviceEnumerator, DEVICE_STATE_ACTIVE,
};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoTaskMemFree, CoUninitialize, CLSCTX_ALL,
    COINIT_APARTMENTTHREADED, STGM,
};
use windows::Win32::UI::Shell::PropertiesSystem::{IPropertyStore, PROPERTYKEY};

/// COM initialization guard that uninitializes COM on drop.
pub struct ComGuard {
    initialized: bool,
}

impl ComGuard {
    /// Initialize COM for the current thread.
    pub fn new() -> Result<Self, AudioError> {
        unsafe {
            // Use apartment-threaded for UI compatibility
            CoInitializeEx(None, COINIT_APARTMENTTHREADED)
                .ok()
                .map_err(|e| AudioError::ComInitFailed(e.to_string()))?;
        }
        Ok(Self { initialized: true })
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.initialized {
            unsafe {
                CoUninitialize();
            }
        }
    }
}

/// Playback endpoint directory using Windows MMDevice API.
///
/// Registers its notification client on construction and unregisters it
/// exactly once when dropped. One instance lives for the whole process.
pub struct DeviceEnumerator {
    enumerator: IMMDeviceEnumerator,
    notification_client: IMMNotificationClient,
}

impl DeviceEnumerator {
    /// Create the enumerator and register `sink` for endpoint notifications.
    ///
    /// Note: COM must be initialized before calling this function.
    pub fn new(sink: Arc<dyn EndpointNotificationSink>) -> Result<Self, AudioError> {
        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                    .map_err(|e| AudioError::DirectoryUnavailable(e.to_string()))?;

            let notification_client: IMMNotificationClient = NotificationClient::new(sink).into();
            enumerator
                .RegisterEndpointNotificationCallback(&notification_client)
                .map_err(|e| AudioError::DirectoryUnavailable(e.to_string()))?;

            debug!("Registered endpoint notification client");
            Ok(Self {
                enumerator,
                notification_client,
            })
        }
    }

    /// Convert an IMMDevice to an AudioEndpoint.
    fn device_to_endpoint(
        &self,
        device: &IMMDevice,
        default_id: Option<&str>,
    ) -> Result<AudioEndpoint, AudioError> {
        let id = unsafe { device.GetId() }
            .map_err(|e| AudioError::DirectoryUnavailable(e.to_string()))?;
        let id = take_co_string(id)?;

        let display_name = self.device_name(device).unwrap_or_else(|| id.clone());
        let is_current_default = default_id == Some(id.as_str());

        Ok(AudioEndpoint {
            id,
            display_name,
            is_current_default,
        })
    }

    /// Get the friendly name of a device from its property store.
    fn device_name(&self, device: &IMMDevice) -> Option<String> {
        unsafe {
            let props: IPropertyStore = device.OpenPropertyStore(STGM(0)).ok()?; // STGM_READ

            // Convert DEVPROPKEY to PROPERTYKEY
            let key = PROPERTYKEY {
                fmtid: DEVPKEY_Device_FriendlyName.fmtid,
                pid: DEVPKEY_Device_FriendlyName.pid,
            };

            let prop = props.GetValue(&key).ok()?;
            let name = prop.to_string();
            if name.is_empty() {
                None
            } else {
                Some(name)
            }
        }
    }
}

impl EndpointDirectory for DeviceEnumerator {
    fn list_active_endpoints(&self) -> Result<Vec<AudioEndpoint>, AudioError> {
        let default_id = self.current_default_id();

        unsafe {
            let collection = self
                .enumerator
                .EnumAudioEndpoints(eRender, DEVICE_STATE_ACTIVE)
                .map_err(|e| AudioError::DirectoryUnavailable(e.to_string()))?;

            let count = collection
                .GetCount()
                .map_err(|e| AudioError::DirectoryUnavailable(e.to_string()))?;

            let mut endpoints = Vec::with_capacity(count as usize);
            for i in 0..count {
                // An endpoint can vanish between GetCount and Item.
                let device = match collection.Item(i) {
                    Ok(device) => device,
                    Err(e) => {
                        warn!(index = i, error = %e, "Skipping unreadable endpoint");
                        continue;
                    }
                };

                match self.device_to_endpoint(&device, default_id.as_deref()) {
                    Ok(endpoint) => endpoints.push(endpoint),
                    Err(e) => warn!(index = i, error = %e, "Skipping unreadable endpoint"),
                }
            }

            Ok(endpoints)
        }
    }

    fn current_default_id(&self) -> Option<String> {
        let device = unsafe { self.enumerator.GetDefaultAudioEndpoint(eRender, eMultimedia) }.ok()?;
        let id = unsafe { device.GetId() }.ok()?;
        take_co_string(id).ok()
    }
}

impl Drop for DeviceEnumerator {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = self
                .enumerator
                .UnregisterEndpointNotificationCallback(&self.notification_client)
            {
                warn!(error = %e, "Failed to unregister endpoint notification client");
            } else {
                debug!("Unregistered endpoint notification client");
            }
        }
    }
}

/// Copy a COM-allocated wide string and free the original.
fn take_co_string(value: PWSTR) -> Result<String, AudioError> {
    unsafe {
        let result = value
            .to_string()
            .map_err(|e| AudioError::StringConversion(e.to_string()));
        CoTaskMemFree(Some(value.0 as *const _));
        result
    }
}
