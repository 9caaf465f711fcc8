//! Windows notification-area icon.
//!
//! tray-icon objects are bound to the thread that created them and need a
//! message pump on that thread. `TraySurface` therefore owns a dedicated
//! thread that builds the icon, pumps messages, turns menu clicks into
//! [`SurfaceEvent`]s and applies [`TrayUpdate`]s until it is told to stop.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::{debug, info, warn};
use tray_icon::menu::{CheckMenuItem, Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder, TrayIconEvent};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, PeekMessageW, TranslateMessage, MSG, PM_REMOVE,
};

use super::console::ConsoleWindow;
use super::event::{EventHandler, MenuItemId, SurfaceEvent, TrayUpdate};
use super::icon::{IconManager, ICON_SIZE};
use super::menu::{MenuBuilder, MenuConfig};
use super::{StatusSurfacePort, SurfaceError, SurfaceEventSender, SurfaceOptions};
use crate::autostart::AutostartPort;

/// How often the tray thread drains its queues.
const PUMP_INTERVAL: Duration = Duration::from_millis(50);

const RUNNING_MESSAGE: &str = "Application is running in system tray";

/// Application name shown on toast notifications.
const APP_NAME: &str = "Standby Guard";

// ============================================================================
// TraySurface
// ============================================================================

/// Status surface backed by a notification-area icon.
#[derive(Debug, Default)]
pub struct TraySurface {
    updates: Option<Sender<TrayUpdate>>,
    thread: Option<JoinHandle<()>>,
    console: ConsoleWindow,
}

impl TraySurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn send(&self, update: TrayUpdate) {
        if let Some(tx) = &self.updates {
            if tx.send(update).is_err() {
                warn!("Tray thread is no longer running");
            }
        }
    }
}

impl StatusSurfacePort for TraySurface {
    fn name(&self) -> &str {
        "tray"
    }

    fn initialize(
        &mut self,
        options: &SurfaceOptions,
        autostart: Arc<dyn AutostartPort>,
        events: SurfaceEventSender,
    ) -> Result<(), SurfaceError> {
        if self.thread.is_some() {
            return Ok(());
        }

        let config =
            MenuBuilder::new().build(options, autostart.is_supported(), autostart.is_enabled());
        let tooltip = IconManager::new().tooltip(&options.tooltip);
        let title = options.title.clone();

        let (update_tx, update_rx) = crossbeam_channel::unbounded();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);

        let handle = thread::Builder::new()
            .name("status-surface".to_string())
            .spawn(move || match NativeTray::build(&config, &tooltip) {
                Ok(tray) => {
                    let _ = ready_tx.send(Ok(()));
                    tray.run(&title, &update_rx, &events);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|e| SurfaceError::Thread(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.updates = Some(update_tx);
                self.thread = Some(handle);
                info!("Tray icon initialized");
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(SurfaceError::Thread(
                    "tray thread exited during startup".to_string(),
                ))
            }
        }
    }

    fn show_notification(&self, title: &str, message: &str) {
        self.send(TrayUpdate::Notify {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn hide(&self) {
        self.console.hide();
    }

    fn restore(&self) {
        self.console.restore();
    }

    fn autostart_changed(&self, enabled: bool) {
        self.send(TrayUpdate::SetAutostartChecked(enabled));
    }

    fn dispose(&mut self) {
        if let Some(tx) = self.updates.take() {
            let _ = tx.send(TrayUpdate::Shutdown);
        }
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("Tray thread panicked");
            }
        }
        self.console.restore();
    }
}

impl Drop for TraySurface {
    fn drop(&mut self) {
        self.dispose();
    }
}

// ============================================================================
// NativeTray (lives on the tray thread)
// ============================================================================

struct NativeIds {
    title: MenuId,
    replay: MenuId,
    autostart: MenuId,
    exit: MenuId,
}

impl NativeIds {
    fn resolve(&self, id: &MenuId) -> MenuItemId {
        if *id == self.replay {
            MenuItemId::Replay
        } else if *id == self.autostart {
            MenuItemId::Autostart
        } else if *id == self.exit {
            MenuItemId::Exit
        } else if *id == self.title {
            MenuItemId::Title
        } else {
            MenuItemId::Unknown
        }
    }
}

struct NativeTray {
    icon: TrayIcon,
    autostart_item: CheckMenuItem,
    ids: NativeIds,
    handler: EventHandler,
}

impl NativeTray {
    fn build(config: &MenuConfig, tooltip: &str) -> Result<Self, SurfaceError> {
        let init_err = |e: &dyn std::fmt::Display| SurfaceError::Initialization(e.to_string());

        let title_item = MenuItem::new(&config.title.text, config.title.enabled, None);
        let replay_item = MenuItem::new(&config.replay.text, config.replay.enabled, None);
        let autostart_item = CheckMenuItem::new(
            &config.autostart.text,
            config.autostart.enabled,
            config.autostart_checked,
            None,
        );
        let exit_item = MenuItem::new(&config.exit.text, config.exit.enabled, None);

        let menu = Menu::new();
        menu.append(&title_item).map_err(|e| init_err(&e))?;
        menu.append(&PredefinedMenuItem::separator())
            .map_err(|e| init_err(&e))?;
        menu.append(&replay_item).map_err(|e| init_err(&e))?;
        menu.append(&autostart_item).map_err(|e| init_err(&e))?;
        menu.append(&PredefinedMenuItem::separator())
            .map_err(|e| init_err(&e))?;
        menu.append(&exit_item).map_err(|e| init_err(&e))?;

        let icon = Icon::from_rgba(IconManager::new().rgba(ICON_SIZE), ICON_SIZE, ICON_SIZE)
            .map_err(|e| init_err(&e))?;

        let tray = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip(tooltip)
            .with_icon(icon)
            .build()
            .map_err(|e| init_err(&e))?;

        Ok(Self {
            icon: tray,
            ids: NativeIds {
                title: title_item.id().clone(),
                replay: replay_item.id().clone(),
                autostart: autostart_item.id().clone(),
                exit: exit_item.id().clone(),
            },
            autostart_item,
            handler: EventHandler::new(),
        })
    }

    fn run(self, title: &str, updates: &Receiver<TrayUpdate>, events: &SurfaceEventSender) {
        'pump: loop {
            pump_messages();

            while let Ok(event) = MenuEvent::receiver().try_recv() {
                let item = self.ids.resolve(&event.id);
                if let Some(surface_event) = self.handler.handle_click(item) {
                    self.forward(events, surface_event);
                }
            }

            while let Ok(event) = TrayIconEvent::receiver().try_recv() {
                if matches!(event, TrayIconEvent::DoubleClick { .. }) {
                    notify(title, RUNNING_MESSAGE);
                }
            }

            loop {
                match updates.try_recv() {
                    Ok(TrayUpdate::Notify { title, message }) => notify(&title, &message),
                    Ok(TrayUpdate::SetAutostartChecked(checked)) => {
                        self.autostart_item.set_checked(checked);
                    }
                    Ok(TrayUpdate::Shutdown) | Err(TryRecvError::Disconnected) => break 'pump,
                    Err(TryRecvError::Empty) => break,
                }
            }

            thread::sleep(PUMP_INTERVAL);
        }

        if let Err(e) = self.icon.set_visible(false) {
            debug!("Failed to hide tray icon: {}", e);
        }
        info!("Tray icon removed");
    }

    fn forward(&self, events: &SurfaceEventSender, event: SurfaceEvent) {
        if events.send(event).is_err() {
            debug!(?event, "Coordinator no longer listens for surface events");
        }
    }
}

fn toast(title: &str, message: &str) -> notify_rust::Notification {
    let mut toast = notify_rust::Notification::new();
    toast.appname(APP_NAME).summary(title).body(message);
    toast
}

/// Shows a toast. Falls back to the log when the toast cannot be shown.
fn notify(title: &str, message: &str) {
    match toast(title, message).show() {
        Ok(_) => debug!(title = %title, "Notification shown"),
        Err(e) => {
            warn!(error = %e, "Failed to show notification");
            info!(title = %title, "{}", message);
        }
    }
}

/// Dispatches every pending window message for this thread.
fn pump_messages() {
    // SAFETY: MSG is plain data, valid when zeroed; the pointers passed refer
    // to that local for the duration of each call.
    unsafe {
        let mut msg: MSG = std::mem::zeroed();
        while PeekMessageW(&mut msg, std::ptr::null_mut(), 0, 0, PM_REMOVE) != 0 {
            TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}
