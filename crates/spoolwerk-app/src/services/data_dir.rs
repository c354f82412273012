// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware config location.

use std::path::PathBuf;

/// Directory holding Spoolwerk's settings. Not created here; saving the
/// config creates it on demand.
pub fn data_dir() -> PathBuf {
    dirs_fallback().join("spoolwerk")
}

/// Default location of the JSON config file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

fn dirs_fallback() -> PathBuf {
    // %APPDATA% on Windows, then XDG, then home
    if let Ok(appdata) = std::env::var("APPDATA") {
        return PathBuf::from(appdata);
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    // Last resort
    std::env::temp_dir()
}
