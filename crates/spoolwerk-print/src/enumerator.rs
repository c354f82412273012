// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Installed-printer discovery.
//
// The spooler hands back raw records (local printers and connections). They
// are turned into validated `PrinterIdentity` values here; records without a
// usable name are dropped rather than surfaced as errors.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use spoolwerk_bridge::NativeSpooler;
use spoolwerk_core::error::Result;
use spoolwerk_core::types::{DeviceListing, PrinterIdentity};

/// Read-only view of the installed printers.
///
/// Every call queries the spooler again, so results always reflect the
/// current system state.
pub struct DeviceEnumerator<'a, S: NativeSpooler + ?Sized> {
    spooler: &'a S,
}

impl<'a, S: NativeSpooler + ?Sized> DeviceEnumerator<'a, S> {
    pub fn new(spooler: &'a S) -> Self {
        Self { spooler }
    }

    /// Installed printers in spooler order. Duplicate names keep their first
    /// position.
    pub fn list_devices(&self) -> Result<Vec<PrinterIdentity>> {
        Ok(self.devices()?.into_iter().map(|(identity, _)| identity).collect())
    }

    /// Validated, deduplicated devices with their network flag.
    fn devices(&self) -> Result<Vec<(PrinterIdentity, bool)>> {
        let records = self.spooler.enumerate_printers()?;
        let total = records.len();

        let mut seen = HashSet::new();
        let devices: Vec<(PrinterIdentity, bool)> = records
            .into_iter()
            .filter_map(|record| {
                let network = record.is_network();
                let name = record.name.unwrap_or_default();
                match PrinterIdentity::new(name) {
                    Ok(identity) => Some((identity, network)),
                    Err(e) => {
                        debug!(error = %e, server = ?record.server, "skipping unnamed printer record");
                        None
                    }
                }
            })
            .filter(|(identity, _)| seen.insert(identity.clone()))
            .collect();

        debug!(reported = total, usable = devices.len(), "printer list built");
        Ok(devices)
    }

    /// The current default printer. `Ok(None)` when no default is set.
    pub fn default_device(&self) -> Result<Option<PrinterIdentity>> {
        let Some(name) = self.spooler.default_printer_name()? else {
            return Ok(None);
        };
        match PrinterIdentity::new(name) {
            Ok(identity) => Ok(Some(identity)),
            Err(e) => {
                warn!(error = %e, "spooler reported an unusable default printer name");
                Ok(None)
            }
        }
    }

    /// Installed printers together with the current default.
    pub fn listing(&self) -> Result<DeviceListing> {
        let (devices, flags): (Vec<_>, Vec<_>) = self.devices()?.into_iter().unzip();
        let network = devices
            .iter()
            .zip(flags)
            .filter_map(|(identity, network)| network.then(|| identity.clone()))
            .collect::<Vec<_>>();
        let default = self.default_device()?;
        info!(
            count = devices.len(),
            network = network.len(),
            default = default.as_ref().map(PrinterIdentity::as_str),
            "printers listed"
        );
        Ok(DeviceListing {
            devices,
            default,
            network,
        })
    }
}
