// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — picks the spooler (real or virtual), loads the
// config, and exposes the operations the command line needs.

use std::path::{Path, PathBuf};

use spoolwerk_bridge::{PlatformBridge, VirtualBridge, platform_bridge};
use spoolwerk_core::AppConfig;
use spoolwerk_core::error::Result;
use spoolwerk_core::types::{DeviceListing, JobReport, PageGeometry, PrinterIdentity};
use spoolwerk_print::DeviceEnumerator;
use tracing::info;

use super::test_page;

/// Name of the printer the virtual spooler offers as its default.
pub const VIRTUAL_PRINTER: &str = "Virtual Printer";

/// Shared application services for one command invocation.
pub struct AppServices {
    bridge: Box<dyn PlatformBridge>,
    config: AppConfig,
    config_path: PathBuf,
    dry_run: bool,
}

impl AppServices {
    /// Load the config at `config_path` and pick a spooler. `dry_run` forces
    /// the virtual spooler even if the config does not ask for it.
    pub fn init(config_path: &Path, dry_run: bool) -> Result<Self> {
        let config = AppConfig::load(config_path)?;
        let dry_run = dry_run || config.dry_run;

        let bridge: Box<dyn PlatformBridge> = if dry_run {
            Box::new(virtual_spooler(&config))
        } else {
            platform_bridge()
        };
        info!(platform = bridge.platform_name(), dry_run, "app services initialised");

        Ok(Self {
            bridge,
            config,
            config_path: config_path.to_path_buf(),
            dry_run,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn platform_name(&self) -> &str {
        self.bridge.platform_name()
    }

    // -- Discovery -----------------------------------------------------------

    pub fn listing(&self) -> Result<DeviceListing> {
        spoolwerk_print::list_devices(self.bridge.as_ref())
    }

    pub fn default_printer(&self) -> Result<Option<PrinterIdentity>> {
        DeviceEnumerator::new(self.bridge.as_ref()).default_device()
    }

    // -- Printing ------------------------------------------------------------

    /// Print `text` as a one-page test document.
    ///
    /// Printer and page size fall back to the config, then to the system
    /// default printer and the driver's default page.
    pub fn print_test_page(
        &self,
        printer: Option<&str>,
        geometry: Option<PageGeometry>,
        text: &str,
    ) -> Result<JobReport> {
        // The virtual spooler hands out handles GDI has never seen.
        let draw = !self.dry_run;

        let outcome = spoolwerk_print::print_configured(
            self.bridge.as_ref(),
            &self.config,
            printer,
            geometry,
            |surface| {
                if draw {
                    test_page::draw(surface, text)
                } else {
                    test_page::layout(text).len()
                }
            },
        )?;
        info!(
            job = %outcome.report.id,
            printer = %outcome.report.printer,
            lines = outcome.value,
            "test page spooled"
        );
        Ok(outcome.report)
    }
}

/// In-memory spooler for dry runs. Offers a default printer plus the
/// configured preferred printer, if any.
fn virtual_spooler(config: &AppConfig) -> VirtualBridge {
    let bridge = VirtualBridge::new().with_default(VIRTUAL_PRINTER);
    match &config.preferred_printer {
        Some(preferred) if preferred.as_str() != VIRTUAL_PRINTER => {
            bridge.with_printer(preferred.as_str())
        }
        _ => bridge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spoolwerk_core::error::SpoolError;
    use spoolwerk_core::types::{JobState, Orientation, PaperSize};

    fn dry_services(config: &AppConfig) -> (tempfile::TempDir, AppServices) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        config.save(&path).expect("save");
        let services = AppServices::init(&path, true).expect("init");
        (dir, services)
    }

    #[test]
    fn dry_run_lists_virtual_printer() {
        let (_dir, services) = dry_services(&AppConfig::default());
        assert!(services.is_dry_run());
        assert_eq!(services.platform_name(), "Virtual spooler");

        let listing = services.listing().expect("listing");
        assert_eq!(listing.devices.len(), 1);
        assert_eq!(
            listing.default.as_ref().map(PrinterIdentity::as_str),
            Some(VIRTUAL_PRINTER)
        );
    }

    #[test]
    fn config_can_enable_dry_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        AppConfig {
            dry_run: true,
            ..Default::default()
        }
        .save(&path)
        .expect("save");
        let services = AppServices::init(&path, false).expect("init");
        assert!(services.is_dry_run());
    }

    #[test]
    fn dry_run_test_page_goes_to_preferred_printer() {
        let config = AppConfig {
            preferred_printer: Some(PrinterIdentity::new("Front Desk").expect("name")),
            ..Default::default()
        };
        let (_dir, services) = dry_services(&config);

        let geometry = PageGeometry::paper(PaperSize::Letter, Orientation::Portrait);
        let report = services
            .print_test_page(None, Some(geometry), "hello")
            .expect("job");
        assert_eq!(report.printer.as_str(), "Front Desk");
        assert_eq!(report.geometry, Some(geometry));
        assert_eq!(report.final_state(), Some(JobState::Released));
    }

    #[test]
    fn dry_run_rejects_unknown_printer() {
        let (_dir, services) = dry_services(&AppConfig::default());
        let err = services
            .print_test_page(Some("Nowhere"), None, "hello")
            .expect_err("unknown");
        assert!(matches!(err, SpoolError::DeviceContext { .. }));
    }

    #[test]
    fn broken_config_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(matches!(
            AppServices::init(&path, true),
            Err(SpoolError::Config(_))
        ));
    }
}
