// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// macOS backend: CUPS for printing, SANE for scanning, Image Capture as the
// manual fallback when SANE is missing or fails.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

use easyprinter_core::error::{EasyPrinterError, Result};
use easyprinter_core::settings::{PrintSettings, ScanSettings};
use easyprinter_core::types::{DocumentKind, PlatformKind};

use crate::command::{self, Timeouts};
use crate::cups::CupsTools;
use crate::traits::PlatformBackend;

pub struct MacOsBackend {
    tools: CupsTools,
}

impl MacOsBackend {
    pub fn new(timeouts: Timeouts, temp_dir: PathBuf) -> Self {
        Self {
            tools: CupsTools::new(timeouts, temp_dir),
        }
    }
}

#[async_trait]
impl PlatformBackend for MacOsBackend {
    fn kind(&self) -> PlatformKind {
        PlatformKind::MacOs
    }

    async fn list_printers(&self) -> Result<Vec<String>> {
        self.tools.list_printers().await
    }

    async fn query_raw_status(&self, printer: &str) -> Result<String> {
        self.tools.query_raw_status(printer).await
    }

    async fn query_queue_depth(&self, printer: &str) -> Result<u32> {
        self.tools.query_queue_depth(printer).await
    }

    async fn list_scanners(&self) -> Result<Vec<String>> {
        self.tools.list_scanners().await
    }

    async fn print_document(
        &self,
        printer: &str,
        path: &Path,
        kind: DocumentKind,
        settings: &PrintSettings,
    ) -> Result<()> {
        self.tools.print(printer, path, kind, settings).await
    }

    async fn scan_document(&self, device: Option<&str>, settings: &ScanSettings) -> Result<Vec<u8>> {
        match self.tools.scan(device, settings).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                warn!(error = %e, "SANE scan failed, opening Image Capture");
                if let Err(open_err) = command::launch_detached("open", ["-a", "Image Capture"]) {
                    warn!(error = %open_err, "could not open Image Capture");
                } else {
                    info!("Image Capture opened for manual scanning");
                }
                Err(EasyPrinterError::ManualScanRequired(format!(
                    "use Image Capture to scan ({e})"
                )))
            }
        }
    }
}
