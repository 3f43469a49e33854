//! Default endpoint switching through the undocumented `IPolicyConfig`
//! interface exposed by `PolicyConfigClient`.

use super::device::{AudioError, DeviceRole, RoleResults, RoleStatus};
use super::traits::DefaultEndpointController;
use tracing::{debug, warn};
use windows::core::*;
use windows::Win32::System::Com::*;

/// IPolicyConfig COM interface (undocumented but stable)
/// Used to set the default audio device
#[windows::core::interface("F8679F50-850A-41CF-9C72-430F290290C8")]
pub unsafe trait IPolicyConfig: IUnknown {
    // Reserved methods to maintain vtable order
    fn reserved1(&self) -> HRESULT;
    fn reserved2(&self) -> HRESULT;
    fn reserved3(&self) -> HRESULT;
    fn reserved4(&self) -> HRESULT;
    fn reserved5(&self) -> HRESULT;
    fn reserved6(&self) -> HRESULT;
    fn reserved7(&self) -> HRESULT;
    fn reserved8(&self) -> HRESULT;
    fn reserved9(&self) -> HRESULT;
    fn reserved10(&self) -> HRESULT;

    fn SetDefaultEndpoint(&self, device_id: PCWSTR, role: u32) -> HRESULT;
}

// PolicyConfigClient CLSID
const CLSID_POLICY_CONFIG_CLIENT: GUID = GUID::from_u128(0x870af99c_171d_4f9e_af0d_e63df40c2bc9);

/// [`DefaultEndpointController`] backed by `IPolicyConfig`.
///
/// A fresh COM object is created per call, so no state survives a switch.
#[derive(Debug, Default, Clone, Copy)]
pub struct PolicyConfig;

impl PolicyConfig {
    pub fn new() -> Self {
        Self
    }
}

impl DefaultEndpointController for PolicyConfig {
    fn set_default(&self, endpoint_id: &str) -> std::result::Result<(), AudioError> {
        let policy_config: IPolicyConfig =
            unsafe { CoCreateInstance(&CLSID_POLICY_CONFIG_CLIENT, None, CLSCTX_ALL) }.map_err(
                |e| {
                    warn!(error = %e, "PolicyConfigClient unavailable");
                    AudioError::SetDefaultFailed {
                        endpoint_id: endpoint_id.to_string(),
                        roles: RoleResults {
                            console: RoleStatus::from_hresult(e.code().0),
                            multimedia: RoleStatus::from_hresult(e.code().0),
                            communications: RoleStatus::from_hresult(e.code().0),
                        },
                    }
                },
            )?;

        let device_id_wide: Vec<u16> = endpoint_id
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();

        // Every role is attempted even if an earlier one fails.
        let mut roles = RoleResults::succeeded();
        for role in DeviceRole::ALL {
            let hr = unsafe {
                policy_config.SetDefaultEndpoint(PCWSTR(device_id_wide.as_ptr()), role as u32)
            };
            debug!(endpoint_id, %role, hresult = format_args!("0x{:08X}", hr.0), "SetDefaultEndpoint");
            roles.set(role, RoleStatus::from_hresult(hr.0));
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
