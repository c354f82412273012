// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Win32 bridge: GDI print spooler and uxtheme window theming.

mod spooler;
mod theme;

use crate::traits::PlatformBridge;

/// Bridge over the real Windows APIs. Stateless; the only process-wide state
/// is the lazily resolved `SetWindowTheme` entry point.
pub struct WindowsBridge;

impl PlatformBridge for WindowsBridge {
    fn platform_name(&self) -> &str {
        "Windows (GDI spooler)"
    }
}

/// NUL-terminated UTF-16 copy of `s`.
fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// The calling thread's last OS error, captured right after a failed call.
fn last_os_error() -> Option<i32> {
    std::io::Error::last_os_error().raw_os_error()
}
