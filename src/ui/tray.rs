//! System tray icon management.
//!
//! Renders the [`MenuEntry`] model through `tray-icon` and maps clicked menu
//! ids back to [`TrayAction`]s.

use super::menu::{MenuEntry, TrayAction};
use crate::platform::icons;
use std::collections::HashMap;
use thiserror::Error;
use tray_icon::{
    menu::{CheckMenuItem, IsMenuItem, Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem, Submenu},
    TrayIcon, TrayIconBuilder, TrayIconEvent,
};

/// Tray service error types.
#[derive(Debug, Error)]
pub enum TrayError {
    #[error("Failed to create tray icon: {0}")]
    CreateFailed(String),

    #[error("Failed to load icon resource: {0}")]
    IconLoadFailed(String),

    #[error("Tray icon not initialized")]
    NotInitialized,

    #[error("Failed to create menu: {0}")]
    MenuFailed(String),
}

/// System tray manager.
#[derive(Default)]
pub struct TrayManager {
    tray_icon: Option<TrayIcon>,
    actions: HashMap<MenuId, TrayAction>,
}

impl TrayManager {
    /// Create a new TrayManager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and show the tray icon.
    pub fn create(
        &mut self,
        entries: &[MenuEntry],
        tooltip: &str,
        has_device: bool,
    ) -> Result<(), TrayError> {
        let icon = Self::icon(has_device)?;
        let menu = self.build_menu(entries)?;

        let tray_icon = TrayIconBuilder::new()
            .with_icon(icon)
            .with_tooltip(tooltip)
            .with_menu(Box::new(menu))
            .build()
            .map_err(|e| TrayError::CreateFailed(e.to_string()))?;

        self.tray_icon = Some(tray_icon);
        Ok(())
    }

    /// Replace the context menu.
    pub fn set_menu(&mut self, entries: &[MenuEntry]) -> Result<(), TrayError> {
        if self.tray_icon.is_none() {
            return Err(TrayError::NotInitialized);
        }
        let menu = self.build_menu(entries)?;
        if let Some(tray) = self.tray_icon.as_mut() {
            tray.set_menu(Some(Box::new(menu)));
        }
        Ok(())
    }

    /// Update the tooltip text.
    pub fn set_tooltip(&mut self, text: &str) -> Result<(), TrayError> {
        let tray = self.tray_icon.as_mut().ok_or(TrayError::NotInitialized)?;
        tray.set_tooltip(Some(text))
            .map_err(|e| TrayError::CreateFailed(e.to_string()))?;
        Ok(())
    }

    /// Switch between the active and idle artwork.
    pub fn set_has_device(&mut self, has_device: bool) -> Result<(), TrayError> {
        let icon = Self::icon(has_device)?;
        let tray = self.tray_icon.as_mut().ok_or(TrayError::NotInitialized)?;
        tray.set_icon(Some(icon))
            .map_err(|e| TrayError::CreateFailed(e.to_string()))?;
        Ok(())
    }

    /// Drain pending menu clicks. Call this from the event loop.
    pub fn poll_actions(&self) -> Vec<TrayAction> {
        // Icon clicks and hovers have no action, but the queue is unbounded.
        while TrayIconEvent::receiver().try_recv().is_ok() {}

        let mut actions = Vec::new();
        while let Ok(event) = MenuEvent::receiver().try_recv() {
            if let Some(action) = self.actions.get(&event.id) {
                actions.push(action.clone());
            }
        }
        actions
    }

    /// Destroy the tray icon.
    pub fn destroy(&mut self) {
        self.tray_icon = None;
        self.actions.clear();
    }

    fn icon(has_device: bool) -> Result<tray_icon::Icon, TrayError> {
        if has_device {
            icons::create_active_icon()
        } else {
            icons::create_idle_icon()
        }
        .map_err(TrayError::IconLoadFailed)
    }

    fn build_menu(&mut self, entries: &[MenuEntry]) -> Result<Menu, TrayError> {
        self.actions.clear();
        let menu = Menu::new();
        for item in self.build_items(entries)? {
            menu.append(item.as_ref())
                .map_err(|e| TrayError::MenuFailed(e.to_string()))?;
        }
        Ok(menu)
    }

    fn build_items(
        &mut self,
        entries: &[MenuEntry],
    ) -> Result<Vec<Box<dyn IsMenuItem>>, TrayError> {
        let mut items: Vec<Box<dyn IsMenuItem>> = Vec::with_capacity(entries.len());

        for entry in entries {
            match entry {
                MenuEntry::Item {
                    label,
                    enabled,
                    action,
                } => {
                    let item = MenuItem::new(label, *enabled, None);
                    if let Some(action) = action {
                        self.actions.insert(item.id().clone(), action.clone());
                    }
                    items.push(Box::new(item));
                }
                MenuEntry::Check {
                    label,
                    checked,
                    action,
                } => {
                    let item = CheckMenuItem::new(label, true, *checked, None);
                    self.actions.insert(item.id().clone(), action.clone());
                    items.push(Box::new(item));
                }
                MenuEntry::Submenu { label, entries } => {
                    let submenu = Submenu::new(label, true);
                    for child in self.build_items(entries)? {
                        submenu
                            .append(child.as_ref())
                            .map_err(|e| TrayError::MenuFailed(e.to_string()))?;
                    }
                    items.push(Box::new(submenu));
                }
                MenuEntry::Separator => items.push(Box::new(PredefinedMenuItem::separator())),
            }
        }

        Ok(items)
    }
}
