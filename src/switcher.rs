//! Ordered cycling through the user's enabled playback devices.
//!
//! Nothing is cached between calls: every switch re-reads the active
//! endpoints and the current default from the directory, so topology changes
//! between hotkey presses are always honored.

use crate::audio::{AudioEndpoint, AudioError, DefaultEndpointController, EndpointDirectory};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info, warn};

/// Cycle direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// The enabled IDs that are present in `active`, in enabled-list order.
pub fn available_endpoints(enabled_ids: &[String], active: &[AudioEndpoint]) -> Vec<AudioEndpoint> {
    enabled_ids
        .iter()
        .filter_map(|id| active.iter().find(|endpoint| &endpoint.id == id))
        .cloned()
        .collect()
}

/// Index to activate next. A current default outside the list (or no default)
/// always lands on the first entry, whatever the direction.
///
/// `len` must be non-zero.
pub fn target_index(current: Option<usize>, len: usize, direction: Direction) -> usize {
    match current {
        None => 0,
        Some(i) => match direction {
            Direction::Next => (i + 1) % len,
            Direction::Previous => (i + len - 1) % len,
        },
    }
}

/// Computes and activates the next default playback endpoint.
pub struct SwitchEngine<D, C> {
    directory: D,
    controller: C,
    // Serializes the read-snapshot-then-set sequence across callers.
    switch_lock: Mutex<()>,
}

impl<D, C> SwitchEngine<D, C>
where
    D: EndpointDirectory,
    C: DefaultEndpointController,
{
    pub fn new(directory: D, controller: C) -> Self {
        Self {
            directory,
            controller,
            switch_lock: Mutex::new(()),
        }
    }

    /// The directory the engine reads from.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Move to the next or previous enabled-and-active endpoint, wrapping at
    /// both ends.
    ///
    /// Returns the endpoint switched to (as it appeared in the pre-switch
    /// snapshot), or `None` when nothing is enabled, nothing enabled is
    /// active, the directory is unreachable, or the Multimedia role could not
    /// be set.
    pub fn switch_directional(
        &self,
        enabled_ids: &[String],
        direction: Direction,
    ) -> Option<AudioEndpoint> {
        if enabled_ids.is_empty() {
            info!("No enabled devices configured");
            return None;
        }

        let _guard = self
            .switch_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let active = self.snapshot()?;
        let available = available_endpoints(enabled_ids, &active);
        if available.is_empty() {
            info!(
                enabled = enabled_ids.len(),
                active = active.len(),
                "No enabled devices are currently active"
            );
            return None;
        }

        let current_id = self.directory.current_default_id();
        let current_index = current_id
            .as_deref()
            .and_then(|id| available.iter().position(|endpoint| endpoint.id == id));
        let index = target_index(current_index, available.len(), direction);

        debug!(
            ?direction,
            current = ?current_index,
            target = index,
            available = available.len(),
            "Computed switch target"
        );

        let target = available[index].clone();
        self.activate(target)
    }

    /// Jump straight to the device at 1-based position `one_based_index` of
    /// the enabled list.
    ///
    /// Unlike [`switch_directional`](Self::switch_directional) this does not
    /// skip inactive entries: if the addressed device is not active the
    /// result is `None` even when other enabled devices are.
    pub fn switch_to_index(
        &self,
        enabled_ids: &[String],
        one_based_index: usize,
    ) -> Option<AudioEndpoint> {
        if one_based_index < 1 || one_based_index > enabled_ids.len() {
            debug!(
                index = one_based_index,
                enabled = enabled_ids.len(),
                "Switch index out of range"
            );
            return None;
        }

        let _guard = self
            .switch_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let target_id = &enabled_ids[one_based_index - 1];
        let active = self.snapshot()?;
        let Some(target) = active.into_iter().find(|endpoint| &endpoint.id == target_id) else {
            info!(
                index = one_based_index,
                endpoint_id = %target_id,
                "Enabled device at index is not active"
            );
            return None;
        };

        self.activate(target)
    }

    fn snapshot(&self) -> Option<Vec<AudioEndpoint>> {
        match self.directory.list_active_endpoints() {
            Ok(active) => Some(active),
            Err(e) => {
                error!(error = %e, "Cannot enumerate playback endpoints");
                None
            }
        }
    }

    fn activate(&self, target: AudioEndpoint) -> Option<AudioEndpoint> {
        match self.controller.set_default(&target.id) {
            Ok(()) => {
                info!(endpoint_id = %target.id, name = %target.display_name, "Switched default device");
                Some(target)
            }
            Err(AudioError::SetDefaultFailed { roles, .. }) if roles.multimedia_succeeded() => {
                warn!(
                    endpoint_id = %target.id,
                    name = %target.display_name,
                    %roles,
                    "Switched default device with some roles failing"
                );
                Some(target)
            }
            Err(e) => {
                error!(endpoint_id = %target.id, name = %target.display_name, error = %e, "Failed to switch default device");
                None
            }
        }
    }
}
