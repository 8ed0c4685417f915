// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic backend trait.

use std::path::Path;

use async_trait::async_trait;

use easyprinter_core::error::Result;
use easyprinter_core::settings::{PrintSettings, ScanSettings};
use easyprinter_core::types::{DocumentKind, PlatformKind, TONER_UNKNOWN};

/// One host's printing and scanning tool chain.
///
/// Implementations shell out to the platform's own utilities and return raw
/// text; interpretation happens in the device layer. Every method bounds
/// its child processes with a timeout.
#[async_trait]
pub trait PlatformBackend: Send + Sync {
    fn kind(&self) -> PlatformKind;

    /// Names of every installed print queue.
    async fn list_printers(&self) -> Result<Vec<String>>;

    /// Unparsed status text for one printer.
    async fn query_raw_status(&self, printer: &str) -> Result<String>;

    /// Number of jobs waiting in the printer's queue.
    async fn query_queue_depth(&self, printer: &str) -> Result<u32>;

    /// Toner level in percent. No backend reads vendor telemetry, so the
    /// default reports "unknown".
    async fn query_toner_level(&self, _printer: &str) -> Result<i32> {
        Ok(TONER_UNKNOWN)
    }

    /// Names of every scanner the platform's scan stack can see.
    async fn list_scanners(&self) -> Result<Vec<String>>;

    /// Print `path` on `printer`, trying the primary tool and then the
    /// fallback.
    async fn print_document(
        &self,
        printer: &str,
        path: &Path,
        kind: DocumentKind,
        settings: &PrintSettings,
    ) -> Result<()>;

    /// Scan one page and return it as encoded image bytes (PNG or BMP).
    /// `device` of `None` lets the scan stack pick its default.
    async fn scan_document(&self, device: Option<&str>, settings: &ScanSettings) -> Result<Vec<u8>>;
}
