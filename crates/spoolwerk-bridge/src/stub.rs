// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for hosts without the GDI spooler.
//
// Queries return `PlatformUnavailable`; lifecycle calls fail the way a
// spooler with no such printer would. The real implementation lives in `win32`.

use spoolwerk_core::error::{OsCallError, Result, SpoolError};
use spoolwerk_core::types::{DcHandle, DeviceModeRequest, PrinterIdentity, PrinterRecord, WindowHandle};

use crate::traits::*;

/// No-op bridge returned on non-Windows platforms.
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Unsupported host (stub)"
    }
}

impl NativeSpooler for StubBridge {
    fn default_printer_name(&self) -> Result<Option<String>> {
        tracing::warn!("NativeSpooler::default_printer_name called on stub bridge");
        Err(SpoolError::PlatformUnavailable)
    }

    fn enumerate_printers(&self) -> Result<Vec<PrinterRecord>> {
        tracing::warn!("NativeSpooler::enumerate_printers called on stub bridge");
        Err(SpoolError::PlatformUnavailable)
    }

    fn create_dc(
        &self,
        printer: &PrinterIdentity,
        _mode: Option<&DeviceModeRequest>,
    ) -> OsResult<DcHandle> {
        tracing::warn!(printer = %printer, "NativeSpooler::create_dc called on stub bridge");
        Err(OsCallError::new("CreateDCW", 0))
    }

    fn start_doc(&self, _dc: DcHandle, _label: &str) -> OsResult<()> {
        Err(OsCallError::new("StartDocW", 0))
    }

    fn start_page(&self, _dc: DcHandle) -> OsResult<()> {
        Err(OsCallError::new("StartPage", 0))
    }

    fn end_page(&self, _dc: DcHandle) -> OsResult<()> {
        Err(OsCallError::new("EndPage", 0))
    }

    fn end_doc(&self, _dc: DcHandle) -> OsResult<()> {
        Err(OsCallError::new("EndDoc", 0))
    }

    fn delete_dc(&self, _dc: DcHandle) -> OsResult<()> {
        Err(OsCallError::new("DeleteDC", 0))
    }
}

impl NativeTheme for StubBridge {
    fn set_window_theme(
        &self,
        _window: WindowHandle,
        _sub_app_name: Option<&str>,
        _sub_id_list: Option<&str>,
    ) -> Result<()> {
        tracing::warn!("NativeTheme::set_window_theme called on stub bridge");
        Err(SpoolError::PlatformUnavailable)
    }
}
