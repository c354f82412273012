// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test page renderer: plain text lines drawn top-down on the page surface.

use spoolwerk_core::types::PageSurface;

/// Text printed when the user supplies none.
pub const DEFAULT_TEXT: &str = "Spoolwerk test page\nIf you can read this, the printer is working.";

/// Left and top margin in device units.
const MARGIN: i32 = 200;
/// Baseline-to-baseline distance in device units.
const LINE_HEIGHT: i32 = 120;

/// Vertical offset of each line, in drawing order.
pub fn layout(text: &str) -> Vec<(i32, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (MARGIN + i as i32 * LINE_HEIGHT, line))
        .collect()
}

/// Draw `text` onto the page. Returns the number of lines the device accepted.
#[cfg(windows)]
pub fn draw(surface: PageSurface, text: &str) -> usize {
    use windows::Win32::Graphics::Gdi::{HDC, TextOutW};

    let hdc = HDC(surface.raw() as *mut _);
    let mut drawn = 0;
    for (y, line) in layout(text) {
        let wide: Vec<u16> = line.encode_utf16().collect();
        if unsafe { TextOutW(hdc, MARGIN, y, &wide) }.as_bool() {
            drawn += 1;
        } else {
            tracing::warn!(y, "TextOutW failed");
        }
    }
    drawn
}

#[cfg(not(windows))]
pub fn draw(surface: PageSurface, text: &str) -> usize {
    tracing::debug!(dc = surface.raw(), lines = layout(text).len(), "no GDI on this host, page left blank");
    0
}
