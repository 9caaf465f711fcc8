//! Tray icon image and tooltip text.
//!
//! The icon is drawn procedurally (a filled disc with a ring, in the
//! "sound on" green) so the binary ships without image assets.

// ============================================================================
// Constants
// ============================================================================

/// Icon edge length in pixels.
pub const ICON_SIZE: u32 = 32;

/// Windows truncates notification-area tooltips past this many characters.
const MAX_TOOLTIP_CHARS: usize = 127;

const FILL: [u8; 4] = [0x2e, 0xa0, 0x43, 0xff];
const RING: [u8; 4] = [0xff, 0xff, 0xff, 0xff];

// ============================================================================
// IconManager
// ============================================================================

/// Generates the tray icon bitmap and tooltip text.
#[derive(Debug, Default)]
pub struct IconManager;

impl IconManager {
    pub fn new() -> Self {
        Self
    }

    /// Renders a `size`×`size` RGBA bitmap, row-major.
    pub fn rgba(&self, size: u32) -> Vec<u8> {
        let mut pixels = vec![0u8; (size * size * 4) as usize];
        let center = (size as f32 - 1.0) / 2.0;
        let outer = size as f32 / 2.0 - 0.5;
        let inner = outer * 0.55;

        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 - center;
                let dy = y as f32 - center;
                let distance = (dx * dx + dy * dy).sqrt();

                let color = if distance <= inner {
                    RING
                } else if distance <= outer {
                    FILL
                } else {
                    continue;
                };

                let offset = ((y * size + x) * 4) as usize;
                pixels[offset..offset + 4].copy_from_slice(&color);
            }
        }

        pixels
    }

    /// Clamps a tooltip to what the notification area can show.
    pub fn tooltip(&self, text: &str) -> String {
        if text.chars().count() <= MAX_TOOLTIP_CHARS {
            return text.to_string();
        }
        let mut clamped: String = text.chars().take(MAX_TOOLTIP_CHARS - 1).collect();
        clamped.push('…');
        clamped
    }
}
