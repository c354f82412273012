// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Spoolwerk.

use std::fmt;

use thiserror::Error;

use crate::types::{CleanupFailure, JobState};

/// A single operating-system call that reported failure.
///
/// GDI print calls signal failure through a non-positive return value and
/// leave the reason in the thread's last-error slot, so both are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsCallError {
    /// Name of the OS entry point (e.g. `StartDocW`).
    pub call: &'static str,
    /// Raw return value of the call.
    pub code: i64,
    /// `GetLastError` value captured right after the call, if any.
    pub last_os_error: Option<i32>,
}

impl OsCallError {
    pub fn new(call: &'static str, code: i64) -> Self {
        Self {
            call,
            code,
            last_os_error: None,
        }
    }

    pub fn with_last_os_error(mut self, err: Option<i32>) -> Self {
        self.last_os_error = err.filter(|e| *e != 0);
        self
    }
}

impl fmt::Display for OsCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} returned {}", self.call, self.code)?;
        if let Some(err) = self.last_os_error {
            write!(f, " (os error {err})")?;
        }
        Ok(())
    }
}

impl std::error::Error for OsCallError {}

/// Top-level error type for all Spoolwerk operations.
#[derive(Debug, Error)]
pub enum SpoolError {
    // -- Configuration --
    #[error("no default printer is configured")]
    NoDefaultDevice,

    #[error("invalid printer name: {0:?}")]
    InvalidPrinterName(String),

    #[error("invalid page geometry: {0}")]
    InvalidGeometry(String),

    #[error("configuration error: {0}")]
    Config(String),

    // -- Acquisition --
    #[error("could not create a device context for printer {printer:?}; check that it is connected")]
    DeviceContext {
        printer: String,
        #[source]
        source: OsCallError,
    },

    // -- Lifecycle --
    #[error("printer {printer:?} refused to start the document")]
    DocumentStart {
        printer: String,
        #[source]
        source: OsCallError,
        /// Closing calls that also failed while the job was unwound.
        cleanup_failures: Vec<CleanupFailure>,
    },

    #[error("printer {printer:?} refused to start a page")]
    PageStart {
        printer: String,
        #[source]
        source: OsCallError,
        /// Closing calls that also failed while the job was unwound.
        cleanup_failures: Vec<CleanupFailure>,
    },

    // -- Platform --
    #[error("printer enumeration failed: {0}")]
    Enumeration(String),

    #[error("{query} kept growing after {attempts} sizing attempts")]
    BufferSizing { query: &'static str, attempts: u32 },

    #[error("window theme assignment failed: {0}")]
    Theme(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Coarse classification of a [`SpoolError`] for callers deciding what to
/// tell the user or whether to try again later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Nothing usable was configured (no default printer, bad name or geometry).
    Configuration,
    /// The device context could not be obtained (printer offline, driver missing).
    Acquisition,
    /// The spooler refused to start the document or page.
    Lifecycle,
    /// Enumeration, theming or host-level failures.
    Platform,
}

impl SpoolError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoDefaultDevice
            | Self::InvalidPrinterName(_)
            | Self::InvalidGeometry(_)
            | Self::Config(_) => ErrorCategory::Configuration,
            Self::DeviceContext { .. } => ErrorCategory::Acquisition,
            Self::DocumentStart { .. } | Self::PageStart { .. } => ErrorCategory::Lifecycle,
            Self::Enumeration(_)
            | Self::BufferSizing { .. }
            | Self::Theme(_)
            | Self::Io(_)
            | Self::Serialization(_)
            | Self::PlatformUnavailable => ErrorCategory::Platform,
        }
    }

    /// Lifecycle state the job failed in, for errors raised by a job.
    pub fn failed_state(&self) -> Option<JobState> {
        match self {
            Self::DeviceContext { .. } => Some(JobState::AcquireFailed),
            Self::DocumentStart { .. } => Some(JobState::DocumentStartFailed),
            Self::PageStart { .. } => Some(JobState::PageStartFailed),
            _ => None,
        }
    }

    /// Closing calls that failed after a lifecycle error. Empty for every
    /// other error.
    pub fn cleanup_failures(&self) -> &[CleanupFailure] {
        match self {
            Self::DocumentStart { cleanup_failures, .. }
            | Self::PageStart { cleanup_failures, .. } => cleanup_failures.as_slice(),
            _ => &[],
        }
    }

    /// The failing OS call behind an acquisition or lifecycle error.
    pub fn os_call(&self) -> Option<&OsCallError> {
        match self {
            Self::DeviceContext { source, .. }
            | Self::DocumentStart { source, .. }
            | Self::PageStart { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SpoolError>;
