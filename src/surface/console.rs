//! Console window visibility (Windows).

use std::sync::atomic::{AtomicBool, Ordering};

use windows_sys::Win32::System::Console::GetConsoleWindow;
use windows_sys::Win32::UI::WindowsAndMessaging::{ShowWindow, SW_HIDE, SW_RESTORE};

/// Tracks whether this process hid its console, so restore only undoes our own hide.
#[derive(Debug, Default)]
pub(super) struct ConsoleWindow {
    hidden: AtomicBool,
}

impl ConsoleWindow {
    pub(super) fn hide(&self) {
        if show_console(SW_HIDE) {
            self.hidden.store(true, Ordering::SeqCst);
            tracing::debug!("Console window hidden");
        }
    }

    pub(super) fn restore(&self) {
        if self.hidden.swap(false, Ordering::SeqCst) {
            show_console(SW_RESTORE);
            tracing::debug!("Console window restored");
        }
    }
}

/// Returns false when the process has no console window.
fn show_console(command: i32) -> bool {
    // SAFETY: GetConsoleWindow takes no arguments and returns null when there
    // is no console; ShowWindow accepts any window handle owned by the process.
    unsafe {
        let hwnd = GetConsoleWindow();
        if hwnd.is_null() {
            return false;
        }
        ShowWindow(hwnd, command);
    }
    true
}
