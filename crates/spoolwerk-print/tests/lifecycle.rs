// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end job lifecycle checks against the virtual spooler.

use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};

use spoolwerk_bridge::{PlatformBridge, SpoolCall, VirtualBridge, VirtualStep};
use spoolwerk_core::config::AppConfig;
use spoolwerk_core::error::{ErrorCategory, SpoolError};
use spoolwerk_core::types::{
    DOCUMENT_LABEL, JobState, Orientation, PageGeometry, PaperSize, PrinterIdentity, PrinterRecord,
};
use spoolwerk_print::{list_devices, print, print_configured, print_with_page};

const FULL_JOB: [&str; 6] = [
    "CreateDCW",
    "StartDocW",
    "StartPage",
    "EndPage",
    "EndDoc",
    "DeleteDC",
];

fn office() -> VirtualBridge {
    VirtualBridge::new()
        .with_printer("Lab")
        .with_default("Office")
}

#[test]
fn successful_job_runs_every_call_once_in_order() {
    let bridge = office();
    let outcome = print(&bridge, None, |_| 42).expect("job");

    assert_eq!(outcome.value, 42);
    assert_eq!(outcome.report.printer.as_str(), "Office");
    assert_eq!(bridge.count("GetDefaultPrinterW"), 1);

    let lifecycle: Vec<_> = bridge
        .call_names()
        .into_iter()
        .filter(|name| *name != "GetDefaultPrinterW")
        .collect();
    assert_eq!(lifecycle, FULL_JOB);
    assert_eq!(bridge.open_handles(), 0);
}

#[test]
fn acquire_failure_makes_no_further_calls() {
    let bridge = office().failing(VirtualStep::CreateDc);
    let called = Cell::new(false);

    let err = print(&bridge, Some("Office"), |_| called.set(true)).expect_err("refused");

    assert!(matches!(err, SpoolError::DeviceContext { .. }));
    assert_eq!(err.category(), ErrorCategory::Acquisition);
    assert_eq!(bridge.call_names(), vec!["CreateDCW"]);
    assert!(!called.get());
}

#[test]
fn unknown_printer_is_an_acquisition_error() {
    let bridge = office();
    let err = print(&bridge, Some("Basement"), |_| ()).expect_err("unknown");
    assert_eq!(err.category(), ErrorCategory::Acquisition);
    assert_eq!(err.os_call().and_then(|c| c.last_os_error), Some(1801));
    assert_eq!(bridge.count("DeleteDC"), 0);
}

#[test]
fn document_start_failure_releases_exactly_once() {
    let bridge = office().failing(VirtualStep::StartDoc);
    let called = Cell::new(false);

    let err = print(&bridge, Some("Office"), |_| called.set(true)).expect_err("refused");

    assert_eq!(err.category(), ErrorCategory::Lifecycle);
    assert_eq!(
        bridge.call_names(),
        vec!["CreateDCW", "StartDocW", "DeleteDC"]
    );
    assert_eq!(bridge.count("EndPage"), 0);
    assert_eq!(bridge.count("EndDoc"), 0);
    assert!(!called.get());
    assert_eq!(bridge.open_handles(), 0);
}

#[test]
fn page_start_failure_ends_document_then_releases() {
    let bridge = office().failing(VirtualStep::StartPage);
    let called = Cell::new(false);

    let err = print(&bridge, Some("Office"), |_| called.set(true)).expect_err("refused");

    assert!(matches!(err, SpoolError::PageStart { .. }));
    assert_eq!(
        bridge.call_names(),
        vec!["CreateDCW", "StartDocW", "StartPage", "EndDoc", "DeleteDC"]
    );
    assert!(!called.get());
}

#[test]
fn panicking_callback_still_cleans_up() {
    let bridge = office();

    let result = catch_unwind(AssertUnwindSafe(|| {
        let _ = print(&bridge, Some("Office"), |_| -> () { panic!("renderer exploded") });
    }));

    assert!(result.is_err());
    assert_eq!(bridge.call_names(), FULL_JOB);
    assert_eq!(bridge.open_handles(), 0);
}

#[test]
fn callback_error_passes_through_after_cleanup() {
    let bridge = office();
    let outcome = print(&bridge, Some("Office"), |_| -> Result<(), String> {
        Err("out of toner in the renderer".into())
    })
    .expect("job itself succeeds");

    assert_eq!(outcome.value, Err("out of toner in the renderer".to_string()));
    assert_eq!(bridge.call_names(), FULL_JOB);
}

#[test]
fn callback_receives_the_live_handle() {
    let bridge = office();
    let outcome = print(&bridge, Some("Office"), |surface| surface.dc()).expect("job");
    let calls = bridge.calls();
    assert_eq!(calls[1], SpoolCall::StartDoc {
        dc: outcome.value,
        label: DOCUMENT_LABEL.to_string(),
    });
    assert_eq!(calls[2], SpoolCall::StartPage(outcome.value));
}

#[test]
fn cleanup_failure_does_not_fail_the_job() {
    let bridge = office().failing(VirtualStep::EndDoc);
    let outcome = print(&bridge, Some("Office"), |_| ()).expect("job");

    assert_eq!(bridge.call_names(), FULL_JOB);
    assert!(!outcome.report.is_clean());
    assert_eq!(outcome.report.cleanup_failures[0].error.call, "EndDoc");
    assert_eq!(bridge.open_handles(), 0);
}

#[test]
fn page_start_error_survives_failing_end_doc() {
    let bridge = office()
        .failing(VirtualStep::StartPage)
        .failing(VirtualStep::EndDoc);

    let err = print(&bridge, None, |_| ()).expect_err("refused");

    assert!(matches!(err, SpoolError::PageStart { .. }));
    assert_eq!(err.os_call().map(|c| c.call), Some("StartPage"));
    assert_eq!(
        bridge.call_names(),
        vec![
            "GetDefaultPrinterW",
            "CreateDCW",
            "StartDocW",
            "StartPage",
            "EndDoc",
            "DeleteDC"
        ]
    );
    assert_eq!(bridge.open_handles(), 0);

    let failures = err.cleanup_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].error.call, "EndDoc");
    assert_eq!(failures[0].stage, JobState::PageStartFailed);
}

#[test]
fn document_start_error_survives_failing_release() {
    let bridge = office()
        .failing(VirtualStep::StartDoc)
        .failing(VirtualStep::DeleteDc);

    let err = print(&bridge, Some("Office"), |_| ()).expect_err("refused");

    assert!(matches!(err, SpoolError::DocumentStart { .. }));
    assert_eq!(err.os_call().map(|c| c.call), Some("StartDocW"));
    assert_eq!(err.category(), ErrorCategory::Lifecycle);
    assert_eq!(bridge.count("DeleteDC"), 1);
    assert_eq!(bridge.count("EndDoc"), 0);
    assert_eq!(err.cleanup_failures()[0].error.call, "DeleteDC");
}

#[test]
fn missing_default_is_a_configuration_error() {
    let bridge = VirtualBridge::new().with_printer("Lab");
    let called = Cell::new(false);

    let err = print(&bridge, None, |_| called.set(true)).expect_err("no default");

    assert!(matches!(err, SpoolError::NoDefaultDevice));
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert_eq!(bridge.count("CreateDCW"), 0);
    assert!(!called.get());
}

#[test]
fn a4_portrait_and_landscape_descriptors() {
    for (landscape, orientation) in [(false, Orientation::Portrait), (true, Orientation::Landscape)] {
        let bridge = office();
        print_with_page(&bridge, Some("Office"), 210, 297, landscape, |_| ()).expect("job");

        let Some(SpoolCall::CreateDc { mode: Some(mode), .. }) = bridge.calls().first().cloned()
        else {
            panic!("first call should create a device context with a mode");
        };
        assert_eq!(mode.paper_width, 2100);
        assert_eq!(mode.paper_length, 2970);
        assert_eq!(mode.orientation, orientation);
    }
}

#[test]
fn bad_geometry_is_rejected_before_any_call() {
    let bridge = office();
    let err = print_with_page(&bridge, None, 0, 297, false, |_| ()).expect_err("zero width");
    assert!(matches!(err, SpoolError::InvalidGeometry(_)));
    assert!(bridge.calls().is_empty());

    let err = print_with_page(&bridge, None, 210, 5000, false, |_| ()).expect_err("too tall");
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(bridge.calls().is_empty());
}

#[test]
fn plain_print_sends_no_device_mode() {
    let bridge = office();
    print(&bridge, Some("Lab"), |_| ()).expect("job");
    assert_eq!(bridge.calls()[0], SpoolCall::CreateDc {
        printer: "Lab".into(),
        mode: None,
    });
}

#[test]
fn list_devices_is_restartable() {
    let bridge = office().with_record(PrinterRecord::default());
    let first = list_devices(&bridge).expect("first");
    let second = list_devices(&bridge).expect("second");

    assert_eq!(first, second);
    let names: Vec<_> = first.devices.iter().map(PrinterIdentity::as_str).collect();
    assert_eq!(names, vec!["Lab", "Office"]);
    assert_eq!(first.default.as_ref().map(PrinterIdentity::as_str), Some("Office"));
}

#[test]
fn config_supplies_printer_and_page() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("spoolwerk.json");
    AppConfig {
        preferred_printer: Some(PrinterIdentity::new("Lab").expect("name")),
        default_page: Some(PageGeometry::paper(PaperSize::A5, Orientation::Portrait)),
        dry_run: true,
    }
    .save(&path)
    .expect("save");
    let config = AppConfig::load(&path).expect("load");

    let bridge = office();
    let outcome = print_configured(&bridge, &config, None, None, |_| ()).expect("job");

    assert_eq!(outcome.report.printer.as_str(), "Lab");
    assert_eq!(bridge.count("GetDefaultPrinterW"), 0);
    let Some(SpoolCall::CreateDc { mode: Some(mode), .. }) = bridge.calls().first().cloned() else {
        panic!("expected a device mode from the configured page");
    };
    assert_eq!((mode.paper_width, mode.paper_length), (1480, 2100));
}

#[test]
fn explicit_arguments_override_config() {
    let config = AppConfig {
        preferred_printer: Some(PrinterIdentity::new("Lab").expect("name")),
        ..Default::default()
    };
    let bridge = office();
    let outcome = print_configured(&bridge, &config, Some("Office"), None, |_| ()).expect("job");
    assert_eq!(outcome.report.printer.as_str(), "Office");
}

#[test]
fn works_through_a_trait_object() {
    let bridge: Box<dyn PlatformBridge> = Box::new(office());
    let outcome = print(bridge.as_ref(), None, |_| "ok").expect("job");
    assert_eq!(outcome.value, "ok");
    assert_eq!(bridge.platform_name(), "Virtual spooler");
}

#[test]
fn independent_jobs_on_separate_threads() {
    let bridge = office();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| print(&bridge, Some("Office"), |_| ()).expect("job"));
        }
    });
    assert_eq!(bridge.count("CreateDCW"), 4);
    assert_eq!(bridge.count("DeleteDC"), 4);
    assert_eq!(bridge.open_handles(), 0);
}
