//! Audio module for Windows Core Audio API interactions.
//!
//! This module provides playback endpoint enumeration, default endpoint
//! switching, and device change notifications.

pub mod device;
#[cfg(windows)]
pub mod enumerator;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;
pub mod notifications;
#[cfg(windows)]
pub mod policy;
pub mod traits;

pub use device::{
    AudioEndpoint, AudioError, AudioEvent, DataFlow, DeviceRole, DeviceState, RoleResults,
    RoleStatus,
};
#[cfg(windows)]
pub use enumerator::{ComGuard, DeviceEnumerator};
pub use notifications::{create_event_channel, NotificationBridge};
#[cfg(windows)]
pub use policy::PolicyConfig;
pub use traits::{DefaultEndpointController, EndpointDirectory, EndpointNotificationSink};
