//! Lifecycle coordinator.
//!
//! Owns the ports for the life of the process and drives the lifecycle:
//!
//! ```text
//! Starting ──► Running ──► ShuttingDown ──► Stopped
//!    │            │              │
//!    │            │              └ disarm timer, stop dispatch,
//!    │            │                dispose surface, release signals
//!    │            └ initial cycle, arm timer, wait for shutdown
//!    └ reconcile autostart, initialize surface
//! ```
//!
//! Shutdown can come from an OS signal, a window close or the surface's exit
//! entry. All of them go through [`ShutdownSignal::request`], so concurrent
//! triggers collapse into a single transition.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use super::cycle::{CycleCounts, PlaybackCycle, Trigger};
use super::scheduler::{Scheduler, DEFAULT_DISARM_GRACE};
use super::shutdown::{ShutdownSignal, ShutdownSource};
use super::signals;
use crate::autostart::{self, AutostartError, AutostartPort};
use crate::config::{ConfigStore, EffectiveConfig};
use crate::playback::PlaybackPort;
use crate::surface::{StatusSurfacePort, SurfaceEvent, SurfaceOptions};

/// Shown once the status surface is up.
pub const RUNNING_NOTIFICATION: &str =
    "Application is running in system tray. Right-click tray icon to exit.";

type SharedSurface = Arc<Mutex<Box<dyn StatusSurfacePort>>>;

fn lock_surface(surface: &SharedSurface) -> MutexGuard<'_, Box<dyn StatusSurfacePort>> {
    surface.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Public types
// ============================================================================

/// Observable lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Running,
    ShuttingDown,
    Stopped,
}

/// The three platform ports, selected before the coordinator exists.
pub struct Ports {
    pub playback: Arc<dyn PlaybackPort>,
    pub autostart: Arc<dyn AutostartPort>,
    pub surface: Box<dyn StatusSurfacePort>,
}

/// What the autostart reconciliation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutostartAction {
    /// The platform has no autostart mechanism
    Unsupported,
    /// Registration already matched the desired state
    Unchanged,
    Enabled,
    Disabled,
}

/// Summary returned once the coordinator has stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitReport {
    /// Which trigger won the shutdown race.
    pub source: Option<ShutdownSource>,
    pub cycles: CycleCounts,
    /// Whether the status surface was initialized successfully.
    pub surface_active: bool,
    /// False if the timer had to be aborted after the grace period.
    pub timer_stopped_cleanly: bool,
}

/// Brings the OS registration in line with `desired`.
///
/// Calls `enable` or `disable` only when the current state differs.
///
/// # Errors
///
/// Returns the port's error if the registration could not be changed.
pub fn reconcile_autostart(
    port: &dyn AutostartPort,
    desired: bool,
) -> autostart::Result<AutostartAction> {
    if !port.is_supported() {
        return Ok(AutostartAction::Unsupported);
    }
    match (port.is_enabled(), desired) {
        (false, true) => port.enable().map(|()| AutostartAction::Enabled),
        (true, false) => port.disable().map(|()| AutostartAction::Disabled),
        _ => Ok(AutostartAction::Unchanged),
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Drives one run of the helper from startup to exit.
pub struct Coordinator {
    config: EffectiveConfig,
    playback: Arc<dyn PlaybackPort>,
    autostart: Arc<dyn AutostartPort>,
    surface: SharedSurface,
    store: Arc<dyn ConfigStore>,
    shutdown: ShutdownSignal,
    options: SurfaceOptions,
    install_signal_handlers: bool,
    disarm_grace: Duration,
    state_tx: watch::Sender<LifecycleState>,
}

impl Coordinator {
    pub fn new(
        config: EffectiveConfig,
        ports: Ports,
        store: Arc<dyn ConfigStore>,
        shutdown: ShutdownSignal,
    ) -> Self {
        let (state_tx, _) = watch::channel(LifecycleState::Starting);
        Self {
            config,
            playback: ports.playback,
            autostart: ports.autostart,
            surface: Arc::new(Mutex::new(ports.surface)),
            store,
            shutdown,
            options: SurfaceOptions::new("Sound Timer", "Sound Timer - Running"),
            install_signal_handlers: false,
            disarm_grace: DEFAULT_DISARM_GRACE,
            state_tx,
        }
    }

    /// Listens for OS signals while running.
    #[must_use]
    pub fn with_signal_handlers(mut self) -> Self {
        self.install_signal_handlers = true;
        self
    }

    #[must_use]
    pub fn with_surface_options(mut self, options: SurfaceOptions) -> Self {
        self.options = options;
        self
    }

    /// How long shutdown waits for in-flight cycles.
    #[must_use]
    pub fn with_disarm_grace(mut self, grace: Duration) -> Self {
        self.disarm_grace = grace;
        self
    }

    pub fn subscribe_state(&self) -> watch::Receiver<LifecycleState> {
        self.state_tx.subscribe()
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    fn set_state(&self, state: LifecycleState) {
        debug!(?state, "Lifecycle state changed");
        self.state_tx.send_replace(state);
    }

    /// Runs until shutdown is requested and teardown has finished.
    pub async fn run(self) -> ExitReport {
        let listeners = if self.install_signal_handlers {
            match signals::install(&self.shutdown) {
                Ok(listeners) => Some(listeners),
                Err(e) => {
                    warn!(error = %e, "Failed to install signal handlers");
                    None
                }
            }
        } else {
            None
        };

        // Starting
        self.apply_autostart().await;

        let cycle = PlaybackCycle::new(
            Arc::clone(&self.playback),
            self.config.sound_path.clone(),
            self.shutdown.clone(),
        );

        let events = if self.config.status_surface_enabled {
            self.start_surface()
        } else {
            debug!("Status surface disabled");
            None
        };
        let surface_active = events.is_some();
        let dispatch = events.map(|events| {
            let dispatcher = Dispatcher {
                cycle: cycle.clone(),
                autostart: Arc::clone(&self.autostart),
                store: Arc::clone(&self.store),
                surface: Arc::clone(&self.surface),
                shutdown: self.shutdown.clone(),
                title: self.options.title.clone(),
            };
            tokio::spawn(dispatcher.run(events))
        });

        // Running
        self.set_state(LifecycleState::Running);
        cycle.run(Trigger::Initial).await;
        let scheduler = Scheduler::arm(cycle.clone(), self.config.delay, self.shutdown.clone())
            .with_grace(self.disarm_grace);

        self.shutdown.wait().await;

        // ShuttingDown
        self.set_state(LifecycleState::ShuttingDown);
        info!("Exiting...");

        let timer_stopped_cleanly = scheduler.disarm().await;
        if let Some(dispatch) = dispatch {
            self.stop_dispatch(dispatch).await;
        }
        if self.config.status_surface_enabled {
            lock_surface(&self.surface).dispose();
        }
        if let Some(listeners) = listeners {
            listeners.release();
        }

        let report = ExitReport {
            source: self.shutdown.source(),
            cycles: cycle.counts(),
            surface_active,
            timer_stopped_cleanly,
        };
        self.set_state(LifecycleState::Stopped);
        report
    }

    async fn apply_autostart(&self) {
        let port = Arc::clone(&self.autostart);
        let desired = self.config.autostart_desired;
        let result =
            tokio::task::spawn_blocking(move || reconcile_autostart(port.as_ref(), desired)).await;

        match result {
            Ok(Ok(AutostartAction::Unsupported)) => {
                if desired {
                    warn!("Start with system is not supported on this platform");
                }
            }
            Ok(Ok(AutostartAction::Unchanged)) => debug!(desired, "Autostart already up to date"),
            Ok(Ok(AutostartAction::Enabled)) => info!("Autostart enabled"),
            Ok(Ok(AutostartAction::Disabled)) => info!("Autostart disabled"),
            Ok(Err(e)) => warn!(error = %e, hint = e.suggestion(), "Failed to update autostart"),
            Err(e) => warn!(error = %e, "Autostart task did not complete"),
        }
    }

    /// Initializes the surface. Returns the event receiver on success.
    fn start_surface(&self) -> Option<mpsc::UnboundedReceiver<SurfaceEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut surface = lock_surface(&self.surface);

        match surface.initialize(&self.options, Arc::clone(&self.autostart), tx) {
            Ok(()) => {
                info!(surface = surface.name(), "Application minimized to system tray");
                surface.hide();
                surface.show_notification(&self.options.title, RUNNING_NOTIFICATION);
                Some(rx)
            }
            Err(e) => {
                warn!(error = %e, "Status surface unavailable, continuing without it");
                None
            }
        }
    }

    async fn stop_dispatch(&self, mut dispatch: JoinHandle<()>) {
        match tokio::time::timeout(self.disarm_grace, &mut dispatch).await {
            Ok(Ok(())) => debug!("Surface event dispatch stopped"),
            Ok(Err(e)) => warn!(error = %e, "Surface event dispatch ended abnormally"),
            Err(_) => {
                warn!("Replay did not finish in time, aborting dispatch");
                dispatch.abort();
            }
        }
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Handles surface events on its own task until shutdown.
struct Dispatcher {
    cycle: PlaybackCycle,
    autostart: Arc<dyn AutostartPort>,
    store: Arc<dyn ConfigStore>,
    surface: SharedSurface,
    shutdown: ShutdownSignal,
    title: String,
}

impl Dispatcher {
    async fn run(self, mut events: mpsc::UnboundedReceiver<SurfaceEvent>) {
        let mut replays = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.wait() => break,
                event = events.recv() => match event {
                    Some(event) => self.handle(event, &mut replays).await,
                    None => {
                        debug!("Status surface closed its event channel");
                        break;
                    }
                },
                Some(_) = replays.join_next(), if !replays.is_empty() => {}
            }
        }

        // Replays already playing finish; their results are only logged.
        while replays.join_next().await.is_some() {}
    }

    async fn handle(&self, event: SurfaceEvent, replays: &mut JoinSet<()>) {
        match event {
            SurfaceEvent::ReplayRequested => {
                info!("Replay requested from status surface");
                let cycle = self.cycle.clone();
                replays.spawn(async move {
                    cycle.run(Trigger::Replay).await;
                });
            }
            SurfaceEvent::ToggleAutostart => self.toggle_autostart().await,
            SurfaceEvent::ExitRequested => {
                self.shutdown.request(ShutdownSource::StatusSurface);
            }
        }
    }

    /// Flips the registration and persists the new desired state.
    async fn toggle_autostart(&self) {
        let port = Arc::clone(&self.autostart);
        let store = Arc::clone(&self.store);

        let result = tokio::task::spawn_blocking(move || {
            let enabled = port.toggle()?;
            let mut config = store.load();
            config.start_with_system = enabled;
            if let Err(e) = store.save(&config) {
                warn!(error = %e, hint = e.suggestion(), "Failed to save configuration");
            }
            Ok::<bool, AutostartError>(enabled)
        })
        .await;

        let surface = lock_surface(&self.surface);
        match result {
            Ok(Ok(enabled)) => {
                let message = if enabled {
                    "Autostart enabled"
                } else {
                    "Autostart disabled"
                };
                info!("{}", message);
                surface.autostart_changed(enabled);
                surface.show_notification(&self.title, message);
            }
            Ok(Err(e)) => {
                warn!(error = %e, hint = e.suggestion(), "Failed to toggle autostart");
                surface.autostart_changed(self.autostart.is_enabled());
                surface.show_notification(&self.title, &format!("Failed to toggle autostart: {e}"));
            }
            Err(e) => warn!(error = %e, "Autostart task did not complete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autostart::{MockAutostartPort, NoopAutostart};

    mod reconcile_tests {
        use super::*;

        #[test]
        fn test_enables_when_desired_and_disabled() {
            let port = MockAutostartPort::new(false);
            let action = reconcile_autostart(&port, true).unwrap();

            assert_eq!(action, AutostartAction::Enabled);
            assert_eq!(port.enable_calls(), 1);
            assert!(port.is_enabled());
        }

        #[test]
        fn test_no_call_when_already_enabled() {
            let port = MockAutostartPort::new(true);
            let action = reconcile_autostart(&port, true).unwrap();

            assert_eq!(action, AutostartAction::Unchanged);
            assert_eq!(port.enable_calls(), 0);
            assert_eq!(port.disable_calls(), 0);
        }

        #[test]
        fn test_disables_when_not_desired() {
            let port = MockAutostartPort::new(true);
            let action = reconcile_autostart(&port, false).unwrap();

            assert_eq!(action, AutostartAction::Disabled);
            assert_eq!(port.disable_calls(), 1);
        }

        #[test]
        fn test_failure_reported() {
            let port = MockAutostartPort::new(false);
            port.set_should_fail(true);

            assert!(reconcile_autostart(&port, true).is_err());
            assert_eq!(port.enable_calls(), 1);
        }

        #[test]
        fn test_unsupported_platform_untouched() {
            let action = reconcile_autostart(&NoopAutostart, true).unwrap();
            assert_eq!(action, AutostartAction::Unsupported);
        }
    }
}
