// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Spoolwerk print-job controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{OsCallError, Result, SpoolError};

/// Label attached to every document handed to the spooler.
pub const DOCUMENT_LABEL: &str = "Spoolwerk Document";

/// Driver name passed to `CreateDCW` for spooled printers.
pub const SPOOLER_DRIVER: &str = "WINSPOOL";

/// Largest paper dimension (mm) whose tenths-of-mm value fits an `i16`.
pub const MAX_PAPER_MM: u32 = (i16::MAX as u32) / 10;

/// Unique identifier for a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name of an installed printer, as known to the print subsystem.
///
/// Always non-empty and free of NUL characters, so it can be handed to the
/// OS as a wide string without truncation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrinterIdentity(String);

impl PrinterIdentity {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() || name.contains('\0') {
            return Err(SpoolError::InvalidPrinterName(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// NUL-terminated UTF-16 form for wide-string OS APIs.
    pub fn to_wide(&self) -> Vec<u16> {
        self.0.encode_utf16().chain(std::iter::once(0)).collect()
    }
}

impl std::fmt::Display for PrinterIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PrinterIdentity {
    type Error = SpoolError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PrinterIdentity> for String {
    fn from(value: PrinterIdentity) -> Self {
        value.0
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn from_landscape(landscape: bool) -> Self {
        if landscape {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }

    /// `DEVMODE.dmOrientation` value (`DMORIENT_PORTRAIT` / `DMORIENT_LANDSCAPE`).
    pub fn devmode_value(&self) -> i16 {
        match self {
            Self::Portrait => 1,
            Self::Landscape => 2,
        }
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

impl PaperSize {
    /// Dimensions in millimetres (width, height), portrait.
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A3 => (297, 420),
            Self::A4 => (210, 297),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
        }
    }
}

/// Physical page size and orientation requested for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GeometryFields")]
pub struct PageGeometry {
    width_mm: u32,
    height_mm: u32,
    orientation: Orientation,
}

impl PageGeometry {
    pub fn new(width_mm: u32, height_mm: u32, orientation: Orientation) -> Result<Self> {
        for (label, value) in [("width", width_mm), ("height", height_mm)] {
            if value == 0 || value > MAX_PAPER_MM {
                return Err(SpoolError::InvalidGeometry(format!(
                    "{label} {value}mm is outside 1..={MAX_PAPER_MM}mm"
                )));
            }
        }
        Ok(Self {
            width_mm,
            height_mm,
            orientation,
        })
    }

    pub fn paper(size: PaperSize, orientation: Orientation) -> Self {
        let (width_mm, height_mm) = size.dimensions_mm();
        Self {
            width_mm,
            height_mm,
            orientation,
        }
    }

    pub fn width_mm(&self) -> u32 {
        self.width_mm
    }

    pub fn height_mm(&self) -> u32 {
        self.height_mm
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Descriptor handed to the OS when creating the device context.
    pub fn device_mode(&self) -> DeviceModeRequest {
        // Bounds were checked in `new`; presets are all far below the limit.
        DeviceModeRequest {
            paper_width: (self.width_mm * 10) as i16,
            paper_length: (self.height_mm * 10) as i16,
            orientation: self.orientation,
            fields: DeviceModeRequest::DM_ORIENTATION
                | DeviceModeRequest::DM_PAPERLENGTH
                | DeviceModeRequest::DM_PAPERWIDTH,
        }
    }
}

#[derive(Deserialize)]
struct GeometryFields {
    width_mm: u32,
    height_mm: u32,
    #[serde(default)]
    orientation: Orientation,
}

impl TryFrom<GeometryFields> for PageGeometry {
    type Error = SpoolError;

    fn try_from(value: GeometryFields) -> Result<Self> {
        Self::new(value.width_mm, value.height_mm, value.orientation)
    }
}

/// Subset of `DEVMODEW` that Spoolwerk fills in: paper size in tenths of a
/// millimetre plus orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceModeRequest {
    pub paper_width: i16,
    pub paper_length: i16,
    pub orientation: Orientation,
    /// `dmFields` mask naming the members that are set.
    pub fields: u32,
}

impl DeviceModeRequest {
    pub const DM_ORIENTATION: u32 = 0x0000_0001;
    pub const DM_PAPERLENGTH: u32 = 0x0000_0004;
    pub const DM_PAPERWIDTH: u32 = 0x0000_0008;
}

/// Raw device-context handle value as returned by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DcHandle(pub isize);

/// The active page surface handed to a render callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSurface {
    dc: DcHandle,
}

impl PageSurface {
    pub fn new(dc: DcHandle) -> Self {
        Self { dc }
    }

    /// Raw handle value; on Windows this is the `HDC` to draw on.
    pub fn raw(&self) -> isize {
        self.dc.0
    }

    pub fn dc(&self) -> DcHandle {
        self.dc
    }
}

/// Raw window handle (`HWND` value on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

/// Lifecycle states of a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Idle,
    DeviceAcquired,
    DocumentStarted,
    PageStarted,
    PageEnded,
    DocumentEnded,
    Released,
    /// The device context could not be created.
    AcquireFailed,
    /// `StartDoc` was refused; the handle is released next.
    DocumentStartFailed,
    /// `StartPage` was refused; the document is ended and the handle released next.
    PageStartFailed,
}

impl JobState {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::AcquireFailed | Self::DocumentStartFailed | Self::PageStartFailed
        )
    }
}

/// One printer entry as reported by the spooler, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrinterRecord {
    pub name: Option<String>,
    /// Server name for connected (network) printers; `None` for local ones.
    pub server: Option<String>,
    /// `PRINTER_ATTRIBUTE_*` flags.
    pub attributes: u32,
}

impl PrinterRecord {
    /// `PRINTER_ATTRIBUTE_NETWORK`
    pub const ATTRIBUTE_NETWORK: u32 = 0x0000_0010;

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// A printer connection on a print server.
    pub fn network(name: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            server: Some(server.into()),
            attributes: Self::ATTRIBUTE_NETWORK,
        }
    }

    /// Reached through a print server rather than attached to this machine.
    pub fn is_network(&self) -> bool {
        self.attributes & Self::ATTRIBUTE_NETWORK != 0 || self.server.is_some()
    }
}

/// Installed printers and the current default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceListing {
    pub devices: Vec<PrinterIdentity>,
    pub default: Option<PrinterIdentity>,
    /// The subset of `devices` reached over the network.
    pub network: Vec<PrinterIdentity>,
}

impl DeviceListing {
    pub fn is_default(&self, device: &PrinterIdentity) -> bool {
        self.default.as_ref() == Some(device)
    }

    pub fn is_network(&self, device: &PrinterIdentity) -> bool {
        self.network.contains(device)
    }
}

/// A cleanup call that failed after the job had already succeeded or failed
/// for another reason. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    /// State the job was leaving when the call failed.
    pub stage: JobState,
    pub error: OsCallError,
}

/// Outcome record of a job that ran to completion.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub id: JobId,
    pub printer: PrinterIdentity,
    pub geometry: Option<PageGeometry>,
    /// Every state the job passed through, in order.
    pub states: Vec<JobState>,
    pub cleanup_failures: Vec<CleanupFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl JobReport {
    pub fn final_state(&self) -> Option<JobState> {
        self.states.last().copied()
    }

    pub fn is_clean(&self) -> bool {
        self.cleanup_failures.is_empty()
    }
}
