// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwerk Print — single-page print jobs and printer discovery on top of a
// `spoolwerk-bridge` spooler.

pub mod controller;
pub mod enumerator;
pub mod theme;

pub use controller::{JobOutcome, PrintJob, PrintJobController};
pub use enumerator::DeviceEnumerator;
pub use theme::apply_window_theme;

use spoolwerk_bridge::NativeSpooler;
use spoolwerk_core::config::AppConfig;
use spoolwerk_core::error::Result;
use spoolwerk_core::types::{DeviceListing, Orientation, PageGeometry, PageSurface};

/// Print one page on `printer` (or the system default) with the driver's
/// default page settings.
pub fn print<S, T, F>(spooler: &S, printer: Option<&str>, render: F) -> Result<JobOutcome<T>>
where
    S: NativeSpooler + ?Sized,
    F: FnOnce(PageSurface) -> T,
{
    PrintJobController::new(spooler).run(printer, None, render)
}

/// Print one page with an explicit paper size in millimetres.
///
/// The size is checked before the spooler is contacted.
pub fn print_with_page<S, T, F>(
    spooler: &S,
    printer: Option<&str>,
    width_mm: u32,
    height_mm: u32,
    landscape: bool,
    render: F,
) -> Result<JobOutcome<T>>
where
    S: NativeSpooler + ?Sized,
    F: FnOnce(PageSurface) -> T,
{
    let geometry = PageGeometry::new(width_mm, height_mm, Orientation::from_landscape(landscape))?;
    PrintJobController::new(spooler).run(printer, Some(geometry), render)
}

/// Print one page, filling in the printer and page size from `config` where
/// the caller gives none.
pub fn print_configured<S, T, F>(
    spooler: &S,
    config: &AppConfig,
    printer: Option<&str>,
    geometry: Option<PageGeometry>,
    render: F,
) -> Result<JobOutcome<T>>
where
    S: NativeSpooler + ?Sized,
    F: FnOnce(PageSurface) -> T,
{
    let printer = printer.or(config.preferred_printer.as_ref().map(|p| p.as_str()));
    let geometry = geometry.or(config.default_page);
    PrintJobController::new(spooler).run(printer, geometry, render)
}

/// Installed printers and the current default.
pub fn list_devices<S: NativeSpooler + ?Sized>(spooler: &S) -> Result<DeviceListing> {
    DeviceEnumerator::new(spooler).listing()
}
