// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwerk — Native platform bridge abstractions.
//
// The print controller never calls the OS directly. It talks to a
// `PlatformBridge`, which is the Win32 spooler on Windows, a stub elsewhere,
// and a scriptable in-process spooler for tests and dry runs.

pub mod traits;
pub mod virtual_bridge;

#[cfg(windows)]
pub mod win32;

#[cfg(not(windows))]
pub mod stub;

pub use traits::{NativeSpooler, NativeTheme, OsResult, PlatformBridge};
pub use virtual_bridge::{SpoolCall, VirtualBridge, VirtualStep};

/// Retrieves the bridge implementation for the target operating system.
pub fn platform_bridge() -> Box<dyn PlatformBridge> {
    #[cfg(windows)]
    {
        Box::new(win32::WindowsBridge)
    }
    #[cfg(not(windows))]
    {
        // Non-Windows hosts have no GDI spooler; every call reports that.
        Box::new(stub::StubBridge)
    }
}
