// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// GDI print spooler calls.
//
// `EnumPrintersW` is a blocking call whose latency depends on network printers
// and drivers; keep it off UI threads.

use std::mem::size_of;

use tracing::{debug, trace};
use windows::Win32::Graphics::Gdi::{CreateDCW, DEVMODE_FIELD_FLAGS, DEVMODEW, DeleteDC, HDC};
use windows::Win32::Graphics::Printing::{EnumPrintersW, GetDefaultPrinterW, PRINTER_INFO_4W};
use windows::Win32::Storage::Xps::{DOCINFOW, EndDoc, EndPage, StartDocW, StartPage};
use windows::core::{PCWSTR, PWSTR};

use spoolwerk_core::error::{OsCallError, Result, SpoolError};
use spoolwerk_core::sizing::{FillOutcome, query_variable_length};
use spoolwerk_core::types::{
    DcHandle, DeviceModeRequest, PrinterIdentity, PrinterRecord, SPOOLER_DRIVER,
};

use super::{WindowsBridge, last_os_error, wide};
use crate::traits::{NativeSpooler, OsResult};

const ERROR_FILE_NOT_FOUND: i32 = 2;
const ERROR_INSUFFICIENT_BUFFER: i32 = 122;

const PRINTER_ENUM_LOCAL: u32 = 0x0000_0002;
const PRINTER_ENUM_CONNECTIONS: u32 = 0x0000_0004;
/// `PRINTER_INFO_4W`: name, server and attributes only; answered from the
/// registry without contacting each printer.
const PRINTER_INFO_LEVEL: u32 = 4;

/// Enumeration buffers are allocated in `u64` words so the records inside are
/// suitably aligned for `PRINTER_INFO_4W`.
const WORD: usize = size_of::<u64>();

fn hdc(dc: DcHandle) -> HDC {
    HDC(dc.0 as *mut _)
}

/// Map a GDI lifecycle result (`> 0` is success) to an `OsResult`.
fn check(call: &'static str, code: i32) -> OsResult<()> {
    if code > 0 {
        trace!(call, code, "spooler call ok");
        Ok(())
    } else {
        Err(OsCallError::new(call, code as i64).with_last_os_error(last_os_error()))
    }
}

fn device_mode(request: &DeviceModeRequest) -> DEVMODEW {
    let mut dm = DEVMODEW {
        dmSize: size_of::<DEVMODEW>() as u16,
        dmFields: DEVMODE_FIELD_FLAGS(request.fields),
        ..Default::default()
    };
    dm.Anonymous1.Anonymous1.dmOrientation = request.orientation.devmode_value();
    dm.Anonymous1.Anonymous1.dmPaperLength = request.paper_length;
    dm.Anonymous1.Anonymous1.dmPaperWidth = request.paper_width;
    dm
}

/// Read a NUL-terminated wide string owned by an OS-filled buffer.
///
/// # Safety
/// `p` must be null or point to a NUL-terminated UTF-16 string.
unsafe fn read_wide(p: PWSTR) -> Option<String> {
    if p.is_null() {
        return None;
    }
    unsafe { p.to_string() }.ok()
}

impl NativeSpooler for WindowsBridge {
    fn default_printer_name(&self) -> Result<Option<String>> {
        let buffer = query_variable_length(
            "GetDefaultPrinterW",
            || {
                let mut needed = 0u32;
                let ok = unsafe { GetDefaultPrinterW(None, &mut needed) }.as_bool();
                match (ok, last_os_error()) {
                    (true, _) | (false, Some(ERROR_INSUFFICIENT_BUFFER)) => Ok(needed as usize),
                    (false, Some(ERROR_FILE_NOT_FOUND)) => Ok(0),
                    (false, err) => Err(SpoolError::Enumeration(format!(
                        "GetDefaultPrinterW failed (os error {err:?})"
                    ))),
                }
            },
            |buf: &mut [u16]| {
                let mut needed = buf.len() as u32;
                let ok = unsafe { GetDefaultPrinterW(Some(PWSTR(buf.as_mut_ptr())), &mut needed) }
                    .as_bool();
                match (ok, last_os_error()) {
                    (true, _) => Ok(FillOutcome::Filled(needed as usize)),
                    (false, Some(ERROR_INSUFFICIENT_BUFFER)) => {
                        Ok(FillOutcome::NeedsMore(needed as usize))
                    }
                    // The default was removed between the two calls.
                    (false, Some(ERROR_FILE_NOT_FOUND)) => Ok(FillOutcome::Filled(0)),
                    (false, err) => Err(SpoolError::Enumeration(format!(
                        "GetDefaultPrinterW failed (os error {err:?})"
                    ))),
                }
            },
        )?;

        let name = buffer.map(|buf| {
            let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
            String::from_utf16_lossy(&buf[..end])
        });
        debug!(default = ?name, "default printer queried");
        Ok(name.filter(|n| !n.is_empty()))
    }

    fn enumerate_printers(&self) -> Result<Vec<PrinterRecord>> {
        let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
        let mut returned = 0u32;

        let buffer = query_variable_length(
            "EnumPrintersW",
            || {
                let mut needed = 0u32;
                let mut count = 0u32;
                let result = unsafe {
                    EnumPrintersW(
                        flags,
                        PCWSTR::null(),
                        PRINTER_INFO_LEVEL,
                        None,
                        &mut needed,
                        &mut count,
                    )
                };
                match result {
                    _ if needed > 0 => Ok((needed as usize).div_ceil(WORD)),
                    Ok(()) => Ok(0),
                    Err(e) => Err(SpoolError::Enumeration(format!("EnumPrintersW: {e}"))),
                }
            },
            |buf: &mut [u64]| {
                let mut needed = 0u32;
                // SAFETY: a `u64` slice is a valid, more strictly aligned byte slice.
                let bytes = unsafe {
                    std::slice::from_raw_parts_mut(buf.as_mut_ptr().cast::<u8>(), buf.len() * WORD)
                };
                let result = unsafe {
                    EnumPrintersW(
                        flags,
                        PCWSTR::null(),
                        PRINTER_INFO_LEVEL,
                        Some(bytes),
                        &mut needed,
                        &mut returned,
                    )
                };
                match result {
                    Ok(()) => Ok(FillOutcome::Filled(buf.len())),
                    Err(_) if needed as usize > buf.len() * WORD => {
                        Ok(FillOutcome::NeedsMore((needed as usize).div_ceil(WORD)))
                    }
                    Err(e) => Err(SpoolError::Enumeration(format!("EnumPrintersW: {e}"))),
                }
            },
        )?;

        let Some(buffer) = buffer else {
            debug!("no printers installed");
            return Ok(Vec::new());
        };

        let capacity = buffer.len() * WORD / size_of::<PRINTER_INFO_4W>();
        let count = (returned as usize).min(capacity);
        // SAFETY: the spooler wrote `returned` records at the start of the
        // buffer, and `count` never exceeds what the buffer can hold. The
        // strings they point to live in the same buffer, which outlives the slice.
        let infos = unsafe {
            std::slice::from_raw_parts(buffer.as_ptr().cast::<PRINTER_INFO_4W>(), count)
        };
        let records = infos
            .iter()
            .map(|info| PrinterRecord {
                name: unsafe { read_wide(info.pPrinterName) },
                server: unsafe { read_wide(info.pServerName) },
                attributes: info.Attributes,
            })
            .collect::<Vec<_>>();

        debug!(count = records.len(), "printers enumerated");
        Ok(records)
    }

    fn create_dc(
        &self,
        printer: &PrinterIdentity,
        mode: Option<&DeviceModeRequest>,
    ) -> OsResult<DcHandle> {
        let driver = wide(SPOOLER_DRIVER);
        let device = printer.to_wide();
        let devmode = mode.map(device_mode);

        let dc = unsafe {
            CreateDCW(
                PCWSTR(driver.as_ptr()),
                PCWSTR(device.as_ptr()),
                PCWSTR::null(),
                devmode.as_ref().map(|dm| dm as *const DEVMODEW),
            )
        };
        if dc.0.is_null() {
            return Err(OsCallError::new("CreateDCW", 0).with_last_os_error(last_os_error()));
        }
        Ok(DcHandle(dc.0 as isize))
    }

    fn start_doc(&self, dc: DcHandle, label: &str) -> OsResult<()> {
        let name = wide(label);
        let info = DOCINFOW {
            cbSize: size_of::<DOCINFOW>() as i32,
            lpszDocName: PCWSTR(name.as_ptr()),
            ..Default::default()
        };
        check("StartDocW", unsafe { StartDocW(hdc(dc), &info) })
    }

    fn start_page(&self, dc: DcHandle) -> OsResult<()> {
        check("StartPage", unsafe { StartPage(hdc(dc)) })
    }

    fn end_page(&self, dc: DcHandle) -> OsResult<()> {
        check("EndPage", unsafe { EndPage(hdc(dc)) })
    }

    fn end_doc(&self, dc: DcHandle) -> OsResult<()> {
        check("EndDoc", unsafe { EndDoc(hdc(dc)) })
    }

    fn delete_dc(&self, dc: DcHandle) -> OsResult<()> {
        if unsafe { DeleteDC(hdc(dc)) }.as_bool() {
            Ok(())
        } else {
            Err(OsCallError::new("DeleteDC", 0).with_last_os_error(last_os_error()))
        }
    }
}
