//! Tray context menu model.
//!
//! The menu is rebuilt from scratch on every device change. Building it is
//! pure so the layout can be checked without a tray.

use crate::audio::AudioEndpoint;

/// Windows truncates tray tooltips beyond this many characters.
const MAX_TOOLTIP_CHARS: usize = 127;

/// What a menu entry does when clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayAction {
    SwitchNext,
    SwitchPrevious,
    /// Jump to a 1-based position in the enabled list
    SwitchToIndex(usize),
    /// Add or remove an endpoint from the cycle
    ToggleEnabled(String),
    ToggleStartup,
    Exit,
}

/// One row of the context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item {
        label: String,
        enabled: bool,
        action: Option<TrayAction>,
    },
    Check {
        label: String,
        checked: bool,
        action: TrayAction,
    },
    Submenu {
        label: String,
        entries: Vec<MenuEntry>,
    },
    Separator,
}

impl MenuEntry {
    fn item(label: impl Into<String>, action: TrayAction) -> Self {
        MenuEntry::Item {
            label: label.into(),
            enabled: true,
            action: Some(action),
        }
    }

    fn disabled(label: impl Into<String>) -> Self {
        MenuEntry::Item {
            label: label.into(),
            enabled: false,
            action: None,
        }
    }
}

/// Lay out the context menu for the given state.
pub fn build_menu_model(
    enabled_ids: &[String],
    active: &[AudioEndpoint],
    start_with_windows: bool,
) -> Vec<MenuEntry> {
    let mut entries = vec![
        MenuEntry::item("Next device", TrayAction::SwitchNext),
        MenuEntry::item("Previous device", TrayAction::SwitchPrevious),
        MenuEntry::Separator,
    ];

    if enabled_ids.is_empty() {
        entries.push(MenuEntry::disabled("No devices enabled"));
    }

    for (i, id) in enabled_ids.iter().enumerate() {
        let position = i + 1;
        match active.iter().find(|endpoint| &endpoint.id == id) {
            Some(endpoint) => entries.push(MenuEntry::Check {
                label: format!("{}. {}", position, endpoint.display_name),
                checked: endpoint.is_current_default,
                action: TrayAction::SwitchToIndex(position),
            }),
            None => entries.push(MenuEntry::disabled(format!(
                "{}. (not connected)",
                position
            ))),
        }
    }

    let cycle_entries = if active.is_empty() {
        vec![MenuEntry::disabled("No playback devices")]
    } else {
        active
            .iter()
            .map(|endpoint| MenuEntry::Check {
                label: endpoint.display_name.clone(),
                checked: enabled_ids.contains(&endpoint.id),
                action: TrayAction::ToggleEnabled(endpoint.id.clone()),
            })
            .collect()
    };

    entries.push(MenuEntry::Submenu {
        label: "Cycle devices".to_string(),
        entries: cycle_entries,
    });
    entries.push(MenuEntry::Separator);
    entries.push(MenuEntry::Check {
        label: "Start with Windows".to_string(),
        checked: start_with_windows,
        action: TrayAction::ToggleStartup,
    });
    entries.push(MenuEntry::item("Exit", TrayAction::Exit));

    entries
}

/// Appended to every tooltip while a hotkey could not be registered.
const HOTKEY_WARNING: &str = "Hotkey registration failed (see log)";

/// Tooltip naming the current default endpoint.
pub fn tooltip_text(active: &[AudioEndpoint], hotkey_warning: bool) -> String {
    let name = active
        .iter()
        .find(|endpoint| endpoint.is_current_default)
        .map(|endpoint| endpoint.display_name.as_str())
        .unwrap_or("No device");

    with_warning(&format!("HearHere: {}", name), hotkey_warning)
}

/// Tooltip shown after a switch request found nothing to switch to.
pub fn no_switch_tooltip(hotkey_warning: bool) -> String {
    with_warning("HearHere: No enabled devices to switch to", hotkey_warning)
}

fn with_warning(text: &str, hotkey_warning: bool) -> String {
    if !hotkey_warning {
        return truncate_tooltip(text, MAX_TOOLTIP_CHARS);
    }
    // The warning line is never cut; the device name gives way.
    let budget = MAX_TOOLTIP_CHARS - HOTKEY_WARNING.chars().count() - 1;
    format!("{}\n{}", truncate_tooltip(text, budget), HOTKEY_WARNING)
}

fn truncate_tooltip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars - 1).collect();
    truncated.push('…');
    truncated
}
