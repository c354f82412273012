// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Window theming through uxtheme.dll.
//
// `SetWindowTheme` is resolved on first use and cached for the life of the
// process. If uxtheme.dll or the export is missing, theming reports
// `PlatformUnavailable` instead of failing at startup.

use once_cell::sync::OnceCell;
use tracing::{debug, warn};
use windows::Win32::Foundation::HWND;
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};
use windows::core::{HRESULT, PCWSTR, s, w};

use spoolwerk_core::error::{Result, SpoolError};
use spoolwerk_core::types::WindowHandle;

use super::{WindowsBridge, wide};
use crate::traits::NativeTheme;

type PfnSetWindowTheme = unsafe extern "system" fn(HWND, PCWSTR, PCWSTR) -> HRESULT;

static SET_WINDOW_THEME: OnceCell<Option<PfnSetWindowTheme>> = OnceCell::new();

fn set_window_theme_fn() -> Option<PfnSetWindowTheme> {
    *SET_WINDOW_THEME.get_or_init(|| unsafe {
        let module = match LoadLibraryW(w!("uxtheme.dll")) {
            Ok(module) => module,
            Err(e) => {
                warn!(error = %e, "uxtheme.dll could not be loaded");
                return None;
            }
        };
        let Some(proc) = GetProcAddress(module, s!("SetWindowTheme")) else {
            warn!("uxtheme.dll has no SetWindowTheme export");
            return None;
        };
        debug!("SetWindowTheme resolved");
        // SAFETY: the export has exactly this signature.
        Some(std::mem::transmute::<
            unsafe extern "system" fn() -> isize,
            PfnSetWindowTheme,
        >(proc))
    })
}

impl NativeTheme for WindowsBridge {
    fn set_window_theme(
        &self,
        window: WindowHandle,
        sub_app_name: Option<&str>,
        sub_id_list: Option<&str>,
    ) -> Result<()> {
        let set_window_theme = set_window_theme_fn().ok_or(SpoolError::PlatformUnavailable)?;

        // Kept alive until after the call.
        let app = sub_app_name.map(wide);
        let ids = sub_id_list.map(wide);
        let as_pcwstr = |s: &Option<Vec<u16>>| {
            s.as_ref()
                .map_or(PCWSTR::null(), |v| PCWSTR(v.as_ptr()))
        };

        let hr = unsafe {
            set_window_theme(
                HWND(window.0 as *mut _),
                as_pcwstr(&app),
                as_pcwstr(&ids),
            )
        };
        hr.ok().map_err(|e| SpoolError::Theme(e.to_string()))?;
        debug!(window = window.0, ?sub_app_name, ?sub_id_list, "window theme applied");
        Ok(())
    }
}
