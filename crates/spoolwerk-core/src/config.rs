// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SpoolError};
use crate::types::{PageGeometry, PrinterIdentity};

/// Persistent application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Printer used when the caller names none. Falls back to the system
    /// default printer when unset.
    pub preferred_printer: Option<PrinterIdentity>,
    /// Page geometry applied when the caller gives no explicit size.
    pub default_page: Option<PageGeometry>,
    /// Run jobs against the virtual spooler instead of real hardware.
    pub dry_run: bool,
}

impl AppConfig {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let config = serde_json::from_str(&text)
            .map_err(|e| SpoolError::Config(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Write settings as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "config saved");
        Ok(())
    }
}
