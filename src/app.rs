//! Application state and lifecycle management.
//!
//! Owns the switch engine, configuration, hotkeys and tray, and reacts to
//! hotkeys, menu clicks and queued audio events on the UI thread.

use crate::audio::{
    create_event_channel, AudioEndpoint, AudioEvent, DeviceEnumerator, EndpointDirectory,
    NotificationBridge, PolicyConfig,
};
use crate::config::{AppConfig, ConfigStore};
use crate::hotkeys::{HotkeyAction, HotkeyError, HotkeyManager};
use crate::platform::StartupRegistration;
use crate::switcher::{Direction, SwitchEngine};
use crate::ui::menu::no_switch_tooltip;
use crate::ui::{build_menu_model, tooltip_text, TrayAction, TrayManager};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{PostMessageW, WM_USER};

/// Posted to the app window after the notification bridge queued an event.
pub const WM_AUDIO_EVENT: u32 = WM_USER + 2;

/// Main application state.
///
/// Fields drop in declaration order: hotkeys, then the tray, then the engine
/// (which unregisters the notification client).
pub struct AppState {
    hotkeys: HotkeyManager,
    tray: TrayManager,
    engine: SwitchEngine<DeviceEnumerator, PolicyConfig>,
    events: Receiver<AudioEvent>,
    config: AppConfig,
    store: ConfigStore,
    startup: StartupRegistration,
    /// Set while a switch hotkey could not be registered
    hotkey_warning: bool,
    should_exit: bool,
}

impl AppState {
    /// Build every component. COM must already be initialized on this thread.
    pub fn new(hwnd: HWND, store: ConfigStore) -> anyhow::Result<Self> {
        let mut config = store.load();

        let (sender, events) = create_event_channel();
        let raw_hwnd = hwnd.0 as isize;
        let bridge = NotificationBridge::with_waker(
            sender,
            Box::new(move || unsafe {
                let _ = PostMessageW(
                    HWND(raw_hwnd as *mut _),
                    WM_AUDIO_EVENT,
                    WPARAM(0),
                    LPARAM(0),
                );
            }),
        );

        let enumerator = DeviceEnumerator::new(Arc::new(bridge))?;
        let engine = SwitchEngine::new(enumerator, PolicyConfig::new());

        // The Run key is the source of truth; the user may edit it elsewhere.
        let startup = StartupRegistration::new();
        config.start_with_windows = startup.is_enabled();

        let mut state = Self {
            hotkeys: HotkeyManager::new(hwnd),
            tray: TrayManager::new(),
            engine,
            events,
            config,
            store,
            startup,
            hotkey_warning: false,
            should_exit: false,
        };

        state.register_hotkeys();

        let active = state.active_endpoints();
        let menu = build_menu_model(
            &state.config.enabled_device_ids,
            &active,
            state.config.start_with_windows,
        );
        state.tray.create(
            &menu,
            &tooltip_text(&active, state.hotkey_warning),
            has_default(&active),
        )?;

        info!(
            enabled = state.config.enabled_device_ids.len(),
            active = active.len(),
            "HearHere started"
        );
        Ok(state)
    }

    /// Whether the user asked to quit.
    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    /// Register both switch hotkeys. Failures are logged and returned; the
    /// other binding still registers. The tooltip warning stays up until a
    /// later registration succeeds for both.
    fn register_hotkeys(&mut self) -> Vec<HotkeyError> {
        self.hotkeys.unregister_all();

        let bindings = [
            (self.config.next_device_hotkey.clone(), HotkeyAction::SwitchNext),
            (
                self.config.previous_device_hotkey.clone(),
                HotkeyAction::SwitchPrevious,
            ),
        ];

        let mut failures = Vec::new();
        for (binding, action) in bindings {
            if let Err(e) = self.hotkeys.register(&binding, action) {
                warn!(?action, error = %e, "Hotkey not available (may conflict with another app)");
                failures.push(e);
            }
        }
        self.hotkey_warning = !failures.is_empty();
        failures
    }

    /// Handle a WM_HOTKEY id.
    pub fn handle_hotkey(&mut self, id: i32) {
        match self.hotkeys.action_for(id) {
            Some(HotkeyAction::SwitchNext) => self.switch(Direction::Next),
            Some(HotkeyAction::SwitchPrevious) => self.switch(Direction::Previous),
            None => debug!(id, "Unknown hotkey id"),
        }
    }

    /// Drain queued audio events and refresh the tray once.
    pub fn handle_audio_events(&mut self) {
        let mut changed = false;
        for event in self.events.try_iter() {
            debug!(?event, "Audio event");
            changed = true;
        }
        if changed {
            self.refresh_tray();
        }
    }

    /// Drain tray clicks and act on them.
    pub fn process_tray_events(&mut self) {
        for action in self.tray.poll_actions() {
            self.handle_tray_action(action);
        }
    }

    fn handle_tray_action(&mut self, action: TrayAction) {
        match action {
            TrayAction::SwitchNext => self.switch(Direction::Next),
            TrayAction::SwitchPrevious => self.switch(Direction::Previous),
            TrayAction::SwitchToIndex(index) => {
                let result = self
                    .engine
                    .switch_to_index(&self.config.enabled_device_ids, index);
                self.show_switch_result(result);
            }
            TrayAction::ToggleEnabled(device_id) => {
                let enabled = self.config.toggle_enabled(&device_id);
                info!(device_id = %device_id, enabled, "Cycle membership changed");
                self.save_config();
                self.refresh_tray();
            }
            TrayAction::ToggleStartup => {
                let enable = !self.config.start_with_windows;
                match self.startup.set_enabled(enable) {
                    Ok(()) => {
                        self.config.start_with_windows = enable;
                        self.save_config();
                    }
                    Err(e) => error!(error = %e, "Failed to change startup registration"),
                }
                self.refresh_tray();
            }
            TrayAction::Exit => {
                info!("Quit requested");
                self.should_exit = true;
            }
        }
    }

    fn switch(&mut self, direction: Direction) {
        let result = self
            .engine
            .switch_directional(&self.config.enabled_device_ids, direction);
        self.show_switch_result(result);
    }

    fn show_switch_result(&mut self, result: Option<AudioEndpoint>) {
        self.refresh_tray();
        if result.is_none() {
            warn!("No device was switched");
            let _ = self.tray.set_tooltip(&no_switch_tooltip(self.hotkey_warning));
        }
    }

    fn save_config(&self) {
        if let Err(e) = self.store.save(&self.config) {
            error!(error = %e, "Failed to save configuration");
        }
    }

    fn active_endpoints(&self) -> Vec<AudioEndpoint> {
        self.engine
            .directory()
            .list_active_endpoints()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Cannot enumerate playback endpoints");
                Vec::new()
            })
    }

    /// Re-query the directory and redraw menu, tooltip and icon.
    fn refresh_tray(&mut self) {
        let active = self.active_endpoints();
        let menu = build_menu_model(
            &self.config.enabled_device_ids,
            &active,
            self.config.start_with_windows,
        );

        if let Err(e) = self.tray.set_menu(&menu) {
            warn!(error = %e, "Failed to rebuild tray menu");
        }
        let _ = self.tray.set_tooltip(&tooltip_text(&active, self.hotkey_warning));
        let _ = self.tray.set_has_device(has_default(&active));
    }

    /// Remove the tray icon before the window goes away.
    pub fn shutdown(&mut self) {
        self.hotkeys.unregister_all();
        self.tray.destroy();
    }
}

fn has_default(active: &[AudioEndpoint]) -> bool {
    active.iter().any(|endpoint| endpoint.is_current_default)
}
