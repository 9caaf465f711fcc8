//! Event handling for status surface interactions.
//!
//! This module handles:
//! - Mapping menu item clicks to actions
//! - Converting actions into [`SurfaceEvent`]s for the coordinator
//! - Commands flowing the other way, from the coordinator to the tray thread
//!
//! Everything here is platform-independent. The tray thread only resolves
//! native menu ids into [`MenuItemId`]s.

use std::fmt;

// ============================================================================
// SurfaceEvent
// ============================================================================

/// Requests a status surface sends to the coordinator.
///
/// The surface never acts on these itself; the coordinator owns the handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The user asked to play the sound right now
    ReplayRequested,
    /// The user flipped the "start with system" entry
    ToggleAutostart,
    /// The user asked the process to exit
    ExitRequested,
}

// ============================================================================
// MenuAction
// ============================================================================

/// Actions that can be triggered from the tray menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Play the sound immediately
    Replay,
    /// Toggle launch at login
    ToggleAutostart,
    /// Quit the helper
    Exit,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuAction::Replay => write!(f, "replay"),
            MenuAction::ToggleAutostart => write!(f, "toggle_autostart"),
            MenuAction::Exit => write!(f, "exit"),
        }
    }
}

impl MenuAction {
    /// Returns the event the coordinator receives for this action.
    pub fn to_event(self) -> SurfaceEvent {
        match self {
            MenuAction::Replay => SurfaceEvent::ReplayRequested,
            MenuAction::ToggleAutostart => SurfaceEvent::ToggleAutostart,
            MenuAction::Exit => SurfaceEvent::ExitRequested,
        }
    }
}

// ============================================================================
// MenuItemId
// ============================================================================

/// Identifiers for menu items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItemId {
    /// Disabled title row
    Title,
    /// "Play sound now"
    Replay,
    /// "Start with ..." check item
    Autostart,
    /// "Exit"
    Exit,
    /// Unknown or unhandled menu item
    Unknown,
}

impl MenuItemId {
    /// Converts a menu item ID to the corresponding action.
    ///
    /// Returns `None` for items that don't trigger actions.
    pub fn to_action(&self) -> Option<MenuAction> {
        match self {
            MenuItemId::Replay => Some(MenuAction::Replay),
            MenuItemId::Autostart => Some(MenuAction::ToggleAutostart),
            MenuItemId::Exit => Some(MenuAction::Exit),
            MenuItemId::Title | MenuItemId::Unknown => None,
        }
    }
}

// ============================================================================
// EventHandler
// ============================================================================

/// Converts menu clicks into surface events.
#[derive(Debug, Default)]
pub struct EventHandler;

impl EventHandler {
    pub fn new() -> Self {
        Self
    }

    /// Processes a menu item click and returns the event to send, if any.
    pub fn handle_click(&self, item_id: MenuItemId) -> Option<SurfaceEvent> {
        let action = item_id.to_action()?;
        tracing::info!(action = %action, "Status surface action received");
        Some(action.to_event())
    }
}

// ============================================================================
// TrayUpdate
// ============================================================================

/// Commands sent from the coordinator to the tray thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayUpdate {
    /// Show a transient notification
    Notify {
        /// Notification title
        title: String,
        /// Notification body
        message: String,
    },
    /// Refresh the autostart check mark
    SetAutostartChecked(bool),
    /// Hide the icon and stop the tray thread
    Shutdown,
}
