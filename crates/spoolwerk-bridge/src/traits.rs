// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the native spooler and theming APIs.

use spoolwerk_core::error::{OsCallError, Result};
use spoolwerk_core::types::{DcHandle, DeviceModeRequest, PrinterIdentity, PrinterRecord, WindowHandle};

/// Result of a single raw spooler call.
pub type OsResult<T> = std::result::Result<T, OsCallError>;

/// Unified bridge that groups all native capabilities.
pub trait PlatformBridge: NativeSpooler + NativeTheme + Send + Sync {
    /// Human-readable platform name (e.g. "Windows (GDI spooler)").
    fn platform_name(&self) -> &str;
}

/// The GDI print spooler.
///
/// Lifecycle calls map one-to-one onto the OS entry points and report a
/// non-positive OS result as an `OsCallError`. They do no bookkeeping of
/// their own; ordering and cleanup are the controller's job.
pub trait NativeSpooler {
    /// Name of the current default printer, or `None` if none is configured.
    fn default_printer_name(&self) -> Result<Option<String>>;

    /// Local and connected printers, in the order the spooler reports them.
    /// Records may carry empty or missing names; callers validate.
    fn enumerate_printers(&self) -> Result<Vec<PrinterRecord>>;

    /// Create a printer device context through the `WINSPOOL` driver.
    fn create_dc(
        &self,
        printer: &PrinterIdentity,
        mode: Option<&DeviceModeRequest>,
    ) -> OsResult<DcHandle>;

    /// Begin spooling a document labelled `label`.
    fn start_doc(&self, dc: DcHandle, label: &str) -> OsResult<()>;

    fn start_page(&self, dc: DcHandle) -> OsResult<()>;

    fn end_page(&self, dc: DcHandle) -> OsResult<()>;

    fn end_doc(&self, dc: DcHandle) -> OsResult<()>;

    /// Release a device context obtained from `create_dc`.
    fn delete_dc(&self, dc: DcHandle) -> OsResult<()>;
}

/// Visual-style assignment for windows.
pub trait NativeTheme {
    /// Apply `sub_app_name` / `sub_id_list` to `window`. Passing `Some("")`
    /// for both turns visual styles off for that window; `None` restores the
    /// default lookup.
    fn set_window_theme(
        &self,
        window: WindowHandle,
        sub_app_name: Option<&str>,
        sub_id_list: Option<&str>,
    ) -> Result<()>;
}
