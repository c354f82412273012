// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process virtual spooler.
//
// Behaves like a spooler with a configurable set of printers, records every
// call in order, and can be told to refuse any individual step. Used for
// dry runs and for every test that would otherwise touch real hardware.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use spoolwerk_core::error::{OsCallError, Result, SpoolError};
use spoolwerk_core::types::{DcHandle, DeviceModeRequest, PrinterIdentity, PrinterRecord, WindowHandle};

use crate::traits::*;

/// `ERROR_INVALID_PRINTER_NAME`, reported when a job targets an unknown printer.
const ERROR_INVALID_PRINTER_NAME: i32 = 1801;
/// Handles start here so they never look like null.
const FIRST_HANDLE: isize = 0x1000;

/// A step the virtual spooler can be scripted to refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualStep {
    DefaultPrinter,
    Enumerate,
    CreateDc,
    StartDoc,
    StartPage,
    EndPage,
    EndDoc,
    DeleteDc,
    SetWindowTheme,
}

/// One recorded call into the virtual spooler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpoolCall {
    DefaultPrinter,
    EnumPrinters,
    CreateDc {
        printer: String,
        mode: Option<DeviceModeRequest>,
    },
    StartDoc {
        dc: DcHandle,
        label: String,
    },
    StartPage(DcHandle),
    EndPage(DcHandle),
    EndDoc(DcHandle),
    DeleteDc(DcHandle),
    SetWindowTheme {
        window: WindowHandle,
        sub_app_name: Option<String>,
        sub_id_list: Option<String>,
    },
}

impl SpoolCall {
    /// OS entry-point name of the call, for compact assertions and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DefaultPrinter => "GetDefaultPrinterW",
            Self::EnumPrinters => "EnumPrintersW",
            Self::CreateDc { .. } => "CreateDCW",
            Self::StartDoc { .. } => "StartDocW",
            Self::StartPage(_) => "StartPage",
            Self::EndPage(_) => "EndPage",
            Self::EndDoc(_) => "EndDoc",
            Self::DeleteDc(_) => "DeleteDC",
            Self::SetWindowTheme { .. } => "SetWindowTheme",
        }
    }
}

#[derive(Debug, Default)]
struct VirtualState {
    printers: Vec<PrinterRecord>,
    default: Option<String>,
    failing: HashSet<VirtualStep>,
    calls: Vec<SpoolCall>,
    open: BTreeSet<isize>,
    next_handle: isize,
}

/// Scriptable spooler living entirely in memory.
#[derive(Debug, Default)]
pub struct VirtualBridge {
    state: Mutex<VirtualState>,
}

impl VirtualBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a printer.
    pub fn with_printer(self, name: impl Into<String>) -> Self {
        self.add_record(PrinterRecord::named(name));
        self
    }

    /// Install a raw record, e.g. one with a missing name.
    pub fn with_record(self, record: PrinterRecord) -> Self {
        self.add_record(record);
        self
    }

    /// Install a printer and make it the default.
    pub fn with_default(self, name: impl Into<String>) -> Self {
        let name = name.into();
        {
            let mut state = self.lock();
            if !state.printers.iter().any(|p| p.name.as_deref() == Some(&name)) {
                state.printers.push(PrinterRecord::named(name.clone()));
            }
            state.default = Some(name);
        }
        self
    }

    /// Make `step` report failure from now on.
    pub fn failing(self, step: VirtualStep) -> Self {
        self.lock().failing.insert(step);
        self
    }

    pub fn add_record(&self, record: PrinterRecord) {
        self.lock().printers.push(record);
    }

    pub fn set_default(&self, name: Option<&str>) {
        self.lock().default = name.map(str::to_owned);
    }

    pub fn set_failing(&self, step: VirtualStep, failing: bool) {
        let mut state = self.lock();
        if failing {
            state.failing.insert(step);
        } else {
            state.failing.remove(&step);
        }
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<SpoolCall> {
        self.lock().calls.clone()
    }

    /// Entry-point names of every call made so far.
    pub fn call_names(&self) -> Vec<&'static str> {
        self.lock().calls.iter().map(SpoolCall::name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.name() == name).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Device contexts created and not yet deleted.
    pub fn open_handles(&self) -> usize {
        self.lock().open.len()
    }

    fn lock(&self) -> MutexGuard<'_, VirtualState> {
        // A panicking render callback never holds this lock, but stay usable regardless.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record `call` and fail it if scripted to.
    fn step(&self, step: VirtualStep, call: SpoolCall) -> OsResult<()> {
        let name = call.name();
        let mut state = self.lock();
        debug!(call = name, "virtual spooler call");
        state.calls.push(call);
        if state.failing.contains(&step) {
            return Err(OsCallError::new(name, 0));
        }
        Ok(())
    }
}

impl PlatformBridge for VirtualBridge {
    fn platform_name(&self) -> &str {
        "Virtual spooler"
    }
}

impl NativeSpooler for VirtualBridge {
    fn default_printer_name(&self) -> Result<Option<String>> {
        self.step(VirtualStep::DefaultPrinter, SpoolCall::DefaultPrinter)
            .map_err(|e| SpoolError::Enumeration(e.to_string()))?;
        Ok(self.lock().default.clone())
    }

    fn enumerate_printers(&self) -> Result<Vec<PrinterRecord>> {
        self.step(VirtualStep::Enumerate, SpoolCall::EnumPrinters)
            .map_err(|e| SpoolError::Enumeration(e.to_string()))?;
        Ok(self.lock().printers.clone())
    }

    fn create_dc(
        &self,
        printer: &PrinterIdentity,
        mode: Option<&DeviceModeRequest>,
    ) -> OsResult<DcHandle> {
        self.step(
            VirtualStep::CreateDc,
            SpoolCall::CreateDc {
                printer: printer.as_str().to_owned(),
                mode: mode.copied(),
            },
        )?;

        let mut state = self.lock();
        let known = state
            .printers
            .iter()
            .any(|p| p.name.as_deref() == Some(printer.as_str()));
        if !known {
            return Err(OsCallError::new("CreateDCW", 0)
                .with_last_os_error(Some(ERROR_INVALID_PRINTER_NAME)));
        }

        let handle = FIRST_HANDLE + state.next_handle;
        state.next_handle += 1;
        state.open.insert(handle);
        Ok(DcHandle(handle))
    }

    fn start_doc(&self, dc: DcHandle, label: &str) -> OsResult<()> {
        self.step(
            VirtualStep::StartDoc,
            SpoolCall::StartDoc {
                dc,
                label: label.to_owned(),
            },
        )
    }

    fn start_page(&self, dc: DcHandle) -> OsResult<()> {
        self.step(VirtualStep::StartPage, SpoolCall::StartPage(dc))
    }

    fn end_page(&self, dc: DcHandle) -> OsResult<()> {
        self.step(VirtualStep::EndPage, SpoolCall::EndPage(dc))
    }

    fn end_doc(&self, dc: DcHandle) -> OsResult<()> {
        self.step(VirtualStep::EndDoc, SpoolCall::EndDoc(dc))
    }

    fn delete_dc(&self, dc: DcHandle) -> OsResult<()> {
        self.step(VirtualStep::DeleteDc, SpoolCall::DeleteDc(dc))?;
        if self.lock().open.remove(&dc.0) {
            Ok(())
        } else {
            Err(OsCallError::new("DeleteDC", 0))
        }
    }
}

impl NativeTheme for VirtualBridge {
    fn set_window_theme(
        &self,
        window: WindowHandle,
        sub_app_name: Option<&str>,
        sub_id_list: Option<&str>,
    ) -> Result<()> {
        self.step(
            VirtualStep::SetWindowTheme,
            SpoolCall::SetWindowTheme {
                window,
                sub_app_name: sub_app_name.map(str::to_owned),
                sub_id_list: sub_id_list.map(str::to_owned),
            },
        )
        .map_err(|e| SpoolError::Theme(e.to_string()))
    }
}
