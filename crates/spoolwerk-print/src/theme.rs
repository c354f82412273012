// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Window visual-style assignment.

use tracing::debug;

use spoolwerk_bridge::NativeTheme;
use spoolwerk_core::error::Result;
use spoolwerk_core::types::WindowHandle;

/// Apply a visual style to `window`.
///
/// `Some("")` for both names switches visual styles off for the window;
/// `None` leaves the lookup to the system.
pub fn apply_window_theme<T: NativeTheme + ?Sized>(
    theme: &T,
    window: WindowHandle,
    sub_app_name: Option<&str>,
    sub_id_list: Option<&str>,
) -> Result<()> {
    debug!(window = window.0, ?sub_app_name, ?sub_id_list, "applying window theme");
    theme.set_window_theme(window, sub_app_name, sub_id_list)
}
