//! Tray menu configuration.
//!
//! The layout is computed here, independent of any native toolkit, so it can
//! be tested on every platform. The tray thread turns a [`MenuConfig`] into
//! native menu items.

use super::SurfaceOptions;

// ============================================================================
// MenuItemConfig
// ============================================================================

/// Configuration for a menu item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemConfig {
    /// Display text for the menu item
    pub text: String,
    /// Whether the menu item is enabled (clickable)
    pub enabled: bool,
}

impl MenuItemConfig {
    pub fn new(text: impl Into<String>, enabled: bool) -> Self {
        Self {
            text: text.into(),
            enabled,
        }
    }
}

// ============================================================================
// MenuConfig
// ============================================================================

/// Complete tray menu layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuConfig {
    /// Title item (always disabled)
    pub title: MenuItemConfig,
    /// "Play sound now"
    pub replay: MenuItemConfig,
    /// "Start with ..." check item
    pub autostart: MenuItemConfig,
    /// Current check state of the autostart item
    pub autostart_checked: bool,
    /// "Exit" (always enabled)
    pub exit: MenuItemConfig,
}

// ============================================================================
// MenuBuilder
// ============================================================================

/// Builds the menu layout from surface options and autostart state.
#[derive(Debug, Default)]
pub struct MenuBuilder;

impl MenuBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Builds the menu configuration.
    ///
    /// The autostart entry is greyed out when the platform has no autostart
    /// mechanism.
    pub fn build(
        &self,
        options: &SurfaceOptions,
        autostart_supported: bool,
        autostart_enabled: bool,
    ) -> MenuConfig {
        MenuConfig {
            title: MenuItemConfig::new(&options.title, false),
            replay: MenuItemConfig::new("Play sound now", true),
            autostart: MenuItemConfig::new(&options.autostart_label, autostart_supported),
            autostart_checked: autostart_supported && autostart_enabled,
            exit: MenuItemConfig::new("Exit", true),
        }
    }
}
