//! Status surface (tray icon) for the helper.
//!
//! This module provides:
//! - [`StatusSurfacePort`]: the port trait the coordinator drives
//! - [`SurfaceEvent`]: replay / toggle-autostart / exit requests sent back
//! - [`NoopSurface`]: fallback for platforms without a tray surface
//! - `TraySurface` (Windows): notification-area icon on a dedicated thread
//! - [`MockStatusSurface`]: recording double for tests
//!
//! # Architecture
//!
//! The module is split into platform-independent and platform-specific parts:
//!
//! - `event.rs`: events, menu actions and tray commands (fully testable)
//! - `menu.rs`: menu layout (fully testable)
//! - `icon.rs`: icon bitmap and tooltip text (fully testable)
//! - `tray.rs`: the native tray icon (Windows only)
//!
//! Events flow from the surface to the coordinator through a tokio channel
//! handed over in [`StatusSurfacePort::initialize`]. Commands flow the other
//! way through a crossbeam channel drained by the tray thread.

pub mod error;
pub mod event;
pub mod icon;
pub mod menu;

#[cfg(windows)]
mod console;
#[cfg(windows)]
mod tray;

pub use error::SurfaceError;
pub use event::{EventHandler, MenuAction, MenuItemId, SurfaceEvent, TrayUpdate};
pub use icon::IconManager;
pub use menu::{MenuBuilder, MenuConfig, MenuItemConfig};
#[cfg(windows)]
pub use tray::TraySurface;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::autostart::AutostartPort;

/// Channel the surface uses to send events to the coordinator.
pub type SurfaceEventSender = mpsc::UnboundedSender<SurfaceEvent>;

// ============================================================================
// SurfaceOptions
// ============================================================================

/// Text shown by the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceOptions {
    /// Application title (menu header, notification title)
    pub title: String,
    /// Hover text of the icon
    pub tooltip: String,
    /// Label of the autostart check item
    pub autostart_label: String,
}

impl SurfaceOptions {
    pub fn new(title: impl Into<String>, tooltip: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tooltip: tooltip.into(),
            autostart_label: "Start with system".to_string(),
        }
    }

    pub fn with_autostart_label(mut self, label: impl Into<String>) -> Self {
        self.autostart_label = label.into();
        self
    }
}

// ============================================================================
// StatusSurfacePort
// ============================================================================

/// Trait for status surface implementations.
///
/// `dispose` must be idempotent and safe to call when `initialize` never ran
/// or failed.
pub trait StatusSurfacePort: Send {
    /// Short implementation name for log lines.
    fn name(&self) -> &str;

    /// Creates the surface and starts delivering events to `events`.
    ///
    /// # Errors
    ///
    /// Returns an error if the native surface could not be created.
    fn initialize(
        &mut self,
        options: &SurfaceOptions,
        autostart: Arc<dyn AutostartPort>,
        events: SurfaceEventSender,
    ) -> Result<(), SurfaceError>;

    /// Shows a transient notification.
    fn show_notification(&self, title: &str, message: &str);

    /// Hides the primary window associated with the process, if any.
    fn hide(&self);

    /// Restores the primary window hidden by [`hide`](Self::hide).
    fn restore(&self);

    /// Reflects a new autostart state in the surface.
    fn autostart_changed(&self, enabled: bool);

    /// Tears the surface down.
    fn dispose(&mut self);
}

// ============================================================================
// NoopSurface
// ============================================================================

/// Status surface for platforms without one. Never sends an event.
#[derive(Debug, Default)]
pub struct NoopSurface;

impl StatusSurfacePort for NoopSurface {
    fn name(&self) -> &str {
        "none"
    }

    fn initialize(
        &mut self,
        _options: &SurfaceOptions,
        _autostart: Arc<dyn AutostartPort>,
        _events: SurfaceEventSender,
    ) -> Result<(), SurfaceError> {
        // The sender is dropped here, so the coordinator's receiver sees a
        // closed channel and no event can ever arrive.
        Ok(())
    }

    fn show_notification(&self, _title: &str, _message: &str) {}

    fn hide(&self) {}

    fn restore(&self) {}

    fn autostart_changed(&self, _enabled: bool) {}

    fn dispose(&mut self) {}
}

// ============================================================================
// MockStatusSurface
// ============================================================================

/// Observable state of a [`MockStatusSurface`], shared with the test.
#[derive(Debug, Default)]
pub struct MockSurfaceState {
    initialize_calls: AtomicUsize,
    dispose_calls: AtomicUsize,
    hidden: AtomicBool,
    fail_initialize: AtomicBool,
    notifications: Mutex<Vec<(String, String)>>,
    autostart_updates: Mutex<Vec<bool>>,
    events: Mutex<Option<SurfaceEventSender>>,
}

impl MockSurfaceState {
    #[must_use]
    pub fn initialize_calls(&self) -> usize {
        self.initialize_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn dispose_calls(&self) -> usize {
        self.dispose_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn notifications(&self) -> Vec<(String, String)> {
        self.notifications.lock().unwrap().clone()
    }

    #[must_use]
    pub fn autostart_updates(&self) -> Vec<bool> {
        self.autostart_updates.lock().unwrap().clone()
    }

    /// Returns true once the coordinator has subscribed to events.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.events.lock().unwrap().is_some()
    }

    /// Simulates a user action. Returns false if nobody is subscribed.
    pub fn emit(&self, event: SurfaceEvent) -> bool {
        match self.events.lock().unwrap().as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }
}

/// Mock status surface for testing.
#[derive(Debug, Default)]
pub struct MockStatusSurface {
    state: Arc<MockSurfaceState>,
}

impl MockStatusSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `initialize` fail with [`SurfaceError::Initialization`].
    #[must_use]
    pub fn failing() -> Self {
        let surface = Self::default();
        surface.state.fail_initialize.store(true, Ordering::SeqCst);
        surface
    }

    /// Returns a handle that stays valid after the surface is moved.
    #[must_use]
    pub fn state(&self) -> Arc<MockSurfaceState> {
        Arc::clone(&self.state)
    }
}

impl StatusSurfacePort for MockStatusSurface {
    fn name(&self) -> &str {
        "mock"
    }

    fn initialize(
        &mut self,
        _options: &SurfaceOptions,
        _autostart: Arc<dyn AutostartPort>,
        events: SurfaceEventSender,
    ) -> Result<(), SurfaceError> {
        self.state.initialize_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_initialize.load(Ordering::SeqCst) {
            return Err(SurfaceError::Initialization("Mock failure".to_string()));
        }
        *self.state.events.lock().unwrap() = Some(events);
        Ok(())
    }

    fn show_notification(&self, title: &str, message: &str) {
        self.state
            .notifications
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }

    fn hide(&self) {
        self.state.hidden.store(true, Ordering::SeqCst);
    }

    fn restore(&self) {
        self.state.hidden.store(false, Ordering::SeqCst);
    }

    fn autostart_changed(&self, enabled: bool) {
        self.state.autostart_updates.lock().unwrap().push(enabled);
    }

    fn dispose(&mut self) {
        self.state.dispose_calls.fetch_add(1, Ordering::SeqCst);
        *self.state.events.lock().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autostart::NoopAutostart;

    fn options() -> SurfaceOptions {
        SurfaceOptions::new("Sound Timer", "Sound Timer - Running")
    }

    mod noop_tests {
        use super::*;

        #[test]
        fn test_noop_never_emits() {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let mut surface = NoopSurface;

            surface
                .initialize(&options(), Arc::new(NoopAutostart), tx)
                .unwrap();
            surface.show_notification("t", "m");
            surface.hide();
            surface.restore();
            surface.autostart_changed(true);
            surface.dispose();

            // Sender was dropped by initialize: the channel is closed and empty.
            assert!(matches!(
                rx.try_recv(),
                Err(mpsc::error::TryRecvError::Disconnected)
            ));
        }

        #[test]
        fn test_noop_dispose_without_initialize() {
            let mut surface = NoopSurface;
            surface.dispose();
            surface.dispose();
        }
    }

    mod mock_tests {
        use super::*;

        #[test]
        fn test_mock_emits_after_initialize() {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let mut surface = MockStatusSurface::new();
            let state = surface.state();

            assert!(!state.emit(SurfaceEvent::ReplayRequested));

            surface
                .initialize(&options(), Arc::new(NoopAutostart), tx)
                .unwrap();
            assert!(state.is_subscribed());
            assert!(state.emit(SurfaceEvent::ReplayRequested));
            assert_eq!(rx.try_recv().unwrap(), SurfaceEvent::ReplayRequested);
        }

        #[test]
        fn test_mock_dispose_unsubscribes() {
            let (tx, _rx) = mpsc::unbounded_channel();
            let mut surface = MockStatusSurface::new();
            let state = surface.state();

            surface
                .initialize(&options(), Arc::new(NoopAutostart), tx)
                .unwrap();
            surface.dispose();
            surface.dispose();

            assert_eq!(state.dispose_calls(), 2);
            assert!(!state.is_subscribed());
        }

        #[test]
        fn test_mock_failing_initialize() {
            let (tx, _rx) = mpsc::unbounded_channel();
            let mut surface = MockStatusSurface::failing();
            let result = surface.initialize(&options(), Arc::new(NoopAutostart), tx);
            assert!(matches!(result, Err(SurfaceError::Initialization(_))));
        }

        #[test]
        fn test_mock_records_calls() {
            let surface = MockStatusSurface::new();
            let state = surface.state();

            surface.hide();
            assert!(state.is_hidden());
            surface.restore();
            assert!(!state.is_hidden());

            surface.show_notification("Title", "Body");
            surface.autostart_changed(true);
            assert_eq!(
                state.notifications(),
                vec![("Title".to_string(), "Body".to_string())]
            );
            assert_eq!(state.autostart_updates(), vec![true]);
        }
    }

    #[test]
    fn test_options_builder() {
        let options = options().with_autostart_label("Start with macOS");
        assert_eq!(options.autostart_label, "Start with macOS");
        assert_eq!(options.tooltip, "Sound Timer - Running");
    }
}
