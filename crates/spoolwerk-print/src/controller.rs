// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-page print job lifecycle.
//
// A job walks the spooler through CreateDC -> StartDoc -> StartPage ->
// render -> EndPage -> EndDoc -> DeleteDC. Once a device context exists it is
// owned by a `DeviceContextGuard`, which issues whichever closing calls the
// job has earned, in order, on every exit path including a panicking render
// callback.

use std::marker::PhantomData;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use spoolwerk_bridge::NativeSpooler;
use spoolwerk_core::error::{OsCallError, Result, SpoolError};
use spoolwerk_core::types::{
    CleanupFailure, DOCUMENT_LABEL, DcHandle, JobId, JobReport, JobState, PageGeometry,
    PageSurface, PrinterIdentity,
};

/// A job whose target printer has been resolved.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub id: JobId,
    pub printer: PrinterIdentity,
    pub geometry: Option<PageGeometry>,
    pub label: &'static str,
}

impl PrintJob {
    pub fn new(printer: PrinterIdentity, geometry: Option<PageGeometry>) -> Self {
        Self {
            id: JobId::new(),
            printer,
            geometry,
            label: DOCUMENT_LABEL,
        }
    }
}

/// What the render callback returned, plus the record of the job.
#[derive(Debug)]
pub struct JobOutcome<T> {
    pub value: T,
    pub report: JobReport,
}

/// Drives print jobs against a spooler.
pub struct PrintJobController<'a, S: NativeSpooler + ?Sized> {
    spooler: &'a S,
}

impl<'a, S: NativeSpooler + ?Sized> PrintJobController<'a, S> {
    pub fn new(spooler: &'a S) -> Self {
        Self { spooler }
    }

    /// Turn an optional printer name into a concrete identity.
    ///
    /// `None` means the system default. An explicit name is validated but not
    /// checked against the installed printers; the spooler does that when the
    /// device context is created.
    pub fn resolve_printer(&self, requested: Option<&str>) -> Result<PrinterIdentity> {
        if let Some(name) = requested {
            return PrinterIdentity::new(name);
        }
        match self.spooler.default_printer_name()? {
            Some(name) => PrinterIdentity::new(name).map_err(|_| SpoolError::NoDefaultDevice),
            None => Err(SpoolError::NoDefaultDevice),
        }
    }

    /// Resolve the printer and run one page through `render`.
    pub fn run<T, F>(
        &self,
        printer: Option<&str>,
        geometry: Option<PageGeometry>,
        render: F,
    ) -> Result<JobOutcome<T>>
    where
        F: FnOnce(PageSurface) -> T,
    {
        let printer = self.resolve_printer(printer)?;
        self.execute(PrintJob::new(printer, geometry), render)
    }

    /// Run an already-resolved job.
    ///
    /// `render` is called exactly once, and only after the page has started.
    /// Whatever it returns is handed back untouched; if it panics the guard
    /// still closes the page, the document and the handle while unwinding.
    #[instrument(skip_all, fields(job = %job.id, printer = %job.printer))]
    pub fn execute<T, F>(&self, job: PrintJob, render: F) -> Result<JobOutcome<T>>
    where
        F: FnOnce(PageSurface) -> T,
    {
        let started_at = Utc::now();
        let mode = job.geometry.map(|g| g.device_mode());

        let dc = match self.spooler.create_dc(&job.printer, mode.as_ref()) {
            Ok(dc) => dc,
            Err(source) => {
                warn!(error = %source, state = ?JobState::AcquireFailed, "device context refused");
                return Err(SpoolError::DeviceContext {
                    printer: job.printer.to_string(),
                    source,
                });
            }
        };
        debug!(dc = dc.0, ?mode, "device context acquired");

        let mut guard = DeviceContextGuard::new(self.spooler, dc);

        if let Err(source) = self.spooler.start_doc(dc, job.label) {
            warn!(error = %source, "document start refused");
            guard.enter(JobState::DocumentStartFailed);
            return Err(SpoolError::DocumentStart {
                printer: job.printer.to_string(),
                source,
                cleanup_failures: guard.abandon(),
            });
        }
        guard.document_started();

        if let Err(source) = self.spooler.start_page(dc) {
            warn!(error = %source, "page start refused");
            guard.enter(JobState::PageStartFailed);
            return Err(SpoolError::PageStart {
                printer: job.printer.to_string(),
                source,
                cleanup_failures: guard.abandon(),
            });
        }
        guard.page_started();

        let value = render(PageSurface::new(dc));

        let (states, cleanup_failures) = guard.finish();
        let report = JobReport {
            id: job.id,
            printer: job.printer,
            geometry: job.geometry,
            states,
            cleanup_failures,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            cleanup_failures = report.cleanup_failures.len(),
            "print job spooled"
        );
        Ok(JobOutcome { value, report })
    }
}

/// Owner of a live device context.
///
/// Tracks which closing calls are still owed and makes each of them at most
/// once. Not `Send`: a device context belongs to the thread that created it.
struct DeviceContextGuard<'a, S: NativeSpooler + ?Sized> {
    spooler: &'a S,
    dc: DcHandle,
    states: Vec<JobState>,
    cleanup_failures: Vec<CleanupFailure>,
    page_open: bool,
    document_open: bool,
    released: bool,
    _not_send: PhantomData<*const ()>,
}

impl<'a, S: NativeSpooler + ?Sized> DeviceContextGuard<'a, S> {
    fn new(spooler: &'a S, dc: DcHandle) -> Self {
        Self {
            spooler,
            dc,
            states: vec![JobState::Idle, JobState::DeviceAcquired],
            cleanup_failures: Vec::new(),
            page_open: false,
            document_open: false,
            released: false,
            _not_send: PhantomData,
        }
    }

    fn enter(&mut self, state: JobState) {
        self.states.push(state);
    }

    fn document_started(&mut self) {
        self.document_open = true;
        self.enter(JobState::DocumentStarted);
    }

    fn page_started(&mut self) {
        self.page_open = true;
        self.enter(JobState::PageStarted);
    }

    /// Issue the outstanding closing calls. A failing call is recorded and
    /// the remaining ones still run.
    fn close(&mut self) {
        if std::thread::panicking() {
            warn!(dc = self.dc.0, "render callback panicked, closing device context");
        }
        if std::mem::take(&mut self.page_open) {
            let result = self.spooler.end_page(self.dc);
            self.settle(result, JobState::PageEnded);
        }
        if std::mem::take(&mut self.document_open) {
            let result = self.spooler.end_doc(self.dc);
            self.settle(result, JobState::DocumentEnded);
        }
        if !self.released {
            self.released = true;
            let result = self.spooler.delete_dc(self.dc);
            self.settle(result, JobState::Released);
        }
    }

    /// The job advances to `next` whether or not the call succeeded.
    fn settle(&mut self, result: std::result::Result<(), OsCallError>, next: JobState) {
        if let Err(error) = result {
            let stage = self.states.last().copied().unwrap_or(JobState::Idle);
            warn!(?stage, error = %error, "cleanup call failed");
            self.cleanup_failures.push(CleanupFailure { stage, error });
        }
        self.enter(next);
    }

    /// Close after a failed start; the failures ride along on the error.
    fn abandon(mut self) -> Vec<CleanupFailure> {
        self.close();
        std::mem::take(&mut self.cleanup_failures)
    }

    fn finish(mut self) -> (Vec<JobState>, Vec<CleanupFailure>) {
        self.close();
        (
            std::mem::take(&mut self.states),
            std::mem::take(&mut self.cleanup_failures),
        )
    }
}

impl<S: NativeSpooler + ?Sized> Drop for DeviceContextGuard<'_, S> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spoolwerk_bridge::{SpoolCall, VirtualBridge, VirtualStep};
    use spoolwerk_core::types::{Orientation, PaperSize};

    const SUCCESS_STATES: [JobState; 7] = [
        JobState::Idle,
        JobState::DeviceAcquired,
        JobState::DocumentStarted,
        JobState::PageStarted,
        JobState::PageEnded,
        JobState::DocumentEnded,
        JobState::Released,
    ];

    fn office() -> VirtualBridge {
        VirtualBridge::new().with_default("Office")
    }

    #[test]
    fn explicit_name_skips_default_query() {
        let bridge = office();
        let printer = PrintJobController::new(&bridge)
            .resolve_printer(Some("Lab"))
            .expect("resolve");
        assert_eq!(printer.as_str(), "Lab");
        assert_eq!(bridge.count("GetDefaultPrinterW"), 0);
    }

    #[test]
    fn blank_explicit_name_is_rejected() {
        let bridge = office();
        let controller = PrintJobController::new(&bridge);
        assert!(matches!(
            controller.resolve_printer(Some("")),
            Err(SpoolError::InvalidPrinterName(_))
        ));
        assert!(matches!(
            controller.resolve_printer(Some("a\0b")),
            Err(SpoolError::InvalidPrinterName(_))
        ));
    }

    #[test]
    fn blank_default_counts_as_missing() {
        let bridge = VirtualBridge::new();
        bridge.set_default(Some(""));
        assert!(matches!(
            PrintJobController::new(&bridge).resolve_printer(None),
            Err(SpoolError::NoDefaultDevice)
        ));
    }

    #[test]
    fn report_lists_every_state_in_order() {
        let bridge = office();
        let outcome = PrintJobController::new(&bridge)
            .run(None, None, |surface| surface.raw())
            .expect("job");
        assert_eq!(outcome.report.states, SUCCESS_STATES);
        assert_eq!(outcome.report.final_state(), Some(JobState::Released));
        assert!(outcome.report.is_clean());
        assert!(outcome.report.finished_at >= outcome.report.started_at);
        assert_eq!(outcome.value, 0x1000);
    }

    #[test]
    fn geometry_travels_to_device_context() {
        let bridge = office();
        let geometry = PageGeometry::paper(PaperSize::A4, Orientation::Landscape);
        let outcome = PrintJobController::new(&bridge)
            .run(Some("Office"), Some(geometry), |_| ())
            .expect("job");
        assert_eq!(outcome.report.geometry, Some(geometry));
        match &bridge.calls()[0] {
            SpoolCall::CreateDc { printer, mode } => {
                assert_eq!(printer, "Office");
                assert_eq!(*mode, Some(geometry.device_mode()));
            }
            other => panic!("unexpected first call {other:?}"),
        }
    }

    #[test]
    fn failed_cleanup_is_recorded_but_not_fatal() {
        let bridge = office().failing(VirtualStep::EndPage);
        let outcome = PrintJobController::new(&bridge)
            .run(None, None, |_| "drawn")
            .expect("job still succeeds");
        assert_eq!(outcome.value, "drawn");
        assert_eq!(outcome.report.cleanup_failures.len(), 1);
        let failure = &outcome.report.cleanup_failures[0];
        assert_eq!(failure.stage, JobState::PageStarted);
        assert_eq!(failure.error.call, "EndPage");
        assert_eq!(outcome.report.states, SUCCESS_STATES);
        assert_eq!(bridge.open_handles(), 0);
    }

    #[test]
    fn document_start_failure_states() {
        let bridge = office().failing(VirtualStep::StartDoc);
        let err = PrintJobController::new(&bridge)
            .run(None, None, |_| ())
            .expect_err("refused");
        assert!(matches!(err, SpoolError::DocumentStart { .. }));
        assert_eq!(err.os_call().map(|c| c.call), Some("StartDocW"));
        assert_eq!(err.failed_state(), Some(JobState::DocumentStartFailed));
        assert!(err.cleanup_failures().is_empty());
        assert_eq!(bridge.open_handles(), 0);
    }

    #[test]
    fn release_failure_after_document_start_failure_is_attached() {
        let bridge = office()
            .failing(VirtualStep::StartDoc)
            .failing(VirtualStep::DeleteDc);
        let err = PrintJobController::new(&bridge)
            .run(None, None, |_| ())
            .expect_err("refused");
        let failures = err.cleanup_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].stage, JobState::DocumentStartFailed);
        assert_eq!(failures[0].error.call, "DeleteDC");
    }

    #[test]
    fn acquire_failure_maps_to_failed_state() {
        let bridge = office().failing(VirtualStep::CreateDc);
        let err = PrintJobController::new(&bridge)
            .run(None, None, |_| ())
            .expect_err("refused");
        assert_eq!(err.failed_state(), Some(JobState::AcquireFailed));
    }

    #[test]
    fn guard_closes_only_what_was_opened() {
        let bridge = office();
        let dc = bridge
            .create_dc(&PrinterIdentity::new("Office").expect("name"), None)
            .expect("dc");
        bridge.clear_calls();

        let mut guard = DeviceContextGuard::new(&bridge, dc);
        guard.document_started();
        let (states, failures) = guard.finish();

        assert_eq!(bridge.call_names(), vec!["EndDoc", "DeleteDC"]);
        assert_eq!(states.last(), Some(&JobState::Released));
        assert!(failures.is_empty());
    }
}
