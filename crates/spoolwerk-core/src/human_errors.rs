// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the command line and embedding UIs.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::{OsCallError, SpoolError};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Spooler busy or restarting; trying again later may work.
    Transient,
    /// User must do something (pick a printer, plug it in, install a driver).
    ActionRequired,
    /// Will not work no matter how often it is retried.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Whether trying again unchanged has a chance of working.
    pub retriable: bool,
    pub severity: Severity,
}

// Win32 error codes that show up behind spooler failures.
const ERROR_FILE_NOT_FOUND: i32 = 2;
const ERROR_ACCESS_DENIED: i32 = 5;
const ERROR_CANCELLED: i32 = 1223;
const RPC_S_SERVER_UNAVAILABLE: i32 = 1722;
const ERROR_UNKNOWN_PRINTER_DRIVER: i32 = 1797;
const ERROR_INVALID_PRINTER_NAME: i32 = 1801;

/// Convert a `SpoolError` into a `HumanError`.
pub fn humanize_error(err: &SpoolError) -> HumanError {
    match err {
        SpoolError::NoDefaultDevice => HumanError {
            message: "No default printer is set.".into(),
            suggestion: "Choose a printer by name, or set a default printer in the system printer settings.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SpoolError::InvalidPrinterName(name) => HumanError {
            message: "That printer name isn't valid.".into(),
            suggestion: format!("Run `spoolwerk list` to see the installed printers. (Name given: {name:?})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SpoolError::InvalidGeometry(detail) => HumanError {
            message: "The page size isn't valid.".into(),
            suggestion: format!("Give the width and height in whole millimetres. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        SpoolError::Config(detail) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: format!("Fix or delete the settings file and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SpoolError::DeviceContext { printer, source } => humanize_os_call(
            source,
            HumanError {
                message: format!("Couldn't connect to \"{printer}\"."),
                suggestion: "Check that the printer is switched on and connected, then try again.".into(),
                retriable: true,
                severity: Severity::ActionRequired,
            },
        ),

        SpoolError::DocumentStart { printer, source, .. } => humanize_os_call(
            source,
            HumanError {
                message: format!("\"{printer}\" wouldn't accept the document."),
                suggestion: "Open the print queue, clear any stuck jobs, and try again.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        ),

        SpoolError::PageStart { printer, source, .. } => humanize_os_call(
            source,
            HumanError {
                message: format!("\"{printer}\" wouldn't start a new page."),
                suggestion: "The document was cancelled. Check the printer for errors, then print again.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        ),

        SpoolError::Enumeration(_) | SpoolError::BufferSizing { .. } => HumanError {
            message: "The list of printers couldn't be read.".into(),
            suggestion: "Make sure the Print Spooler service is running, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SpoolError::Theme(detail) => HumanError {
            message: "The window style couldn't be changed.".into(),
            suggestion: format!("The window keeps its current look. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        SpoolError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "Spoolwerk doesn't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or use a different location.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        SpoolError::Serialization(_) => HumanError {
            message: "Settings couldn't be saved.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SpoolError::PlatformUnavailable => HumanError {
            message: "Printing isn't available on this system.".into(),
            suggestion: "Spoolwerk drives the Windows print spooler. Use --dry-run to try it elsewhere.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

/// Refine a generic message using the OS error code behind it.
fn humanize_os_call(call: &OsCallError, fallback: HumanError) -> HumanError {
    match call.last_os_error {
        Some(ERROR_INVALID_PRINTER_NAME) | Some(ERROR_FILE_NOT_FOUND) => HumanError {
            message: "That printer isn't installed.".into(),
            suggestion: "Run `spoolwerk list` to see the installed printers.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        Some(ERROR_UNKNOWN_PRINTER_DRIVER) => HumanError {
            message: "The printer's driver is missing.".into(),
            suggestion: "Reinstall the printer from the system printer settings.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        Some(ERROR_ACCESS_DENIED) => HumanError {
            message: "You don't have permission to print to this printer.".into(),
            suggestion: "Ask an administrator to grant print access.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
        Some(ERROR_CANCELLED) => HumanError {
            message: "Printing was cancelled.".into(),
            suggestion: "Print again when ready.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },
        Some(RPC_S_SERVER_UNAVAILABLE) => HumanError {
            message: "The Print Spooler service isn't running.".into(),
            suggestion: "Start the Print Spooler service, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
        _ => fallback,
    }
}
