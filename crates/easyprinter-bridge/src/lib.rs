// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// EasyPrinter: platform backends.
//
// Each backend drives one host's print and scan utilities as child
// processes. All three compile everywhere; only the hidden-window flag is
// Windows-specific.

pub mod command;
pub mod cups;
pub mod linux;
pub mod macos;
pub mod traits;
pub mod windows;

use std::sync::Arc;

use easyprinter_core::config::DeviceConfig;
use easyprinter_core::types::PlatformKind;

pub use command::Timeouts;
pub use traits::PlatformBackend;

/// Build the backend for `config.platform()`, selected once at startup.
pub fn platform_backend(config: &DeviceConfig) -> Arc<dyn PlatformBackend> {
    let timeouts = Timeouts::from_config(config);
    let temp_dir = config.temp_dir();
    let kind = config.platform();
    tracing::info!(platform = %kind, "selected platform backend");

    match kind {
        PlatformKind::Windows => Arc::new(windows::WindowsBackend::new(timeouts, temp_dir)),
        PlatformKind::MacOs => Arc::new(macos::MacOsBackend::new(timeouts, temp_dir)),
        PlatformKind::Linux => Arc::new(linux::LinuxBackend::new(timeouts, temp_dir)),
    }
}
