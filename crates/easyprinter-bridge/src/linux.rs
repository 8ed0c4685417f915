// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Linux backend: CUPS for printing, SANE for scanning.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use easyprinter_core::error::Result;
use easyprinter_core::settings::{PrintSettings, ScanSettings};
use easyprinter_core::types::{DocumentKind, PlatformKind};

use crate::command::Timeouts;
use crate::cups::CupsTools;
use crate::traits::PlatformBackend;

pub struct LinuxBackend {
    tools: CupsTools,
}

impl LinuxBackend {
    pub fn new(timeouts: Timeouts, temp_dir: PathBuf) -> Self {
        Self {
            tools: CupsTools::new(timeouts, temp_dir),
        }
    }
}

#[async_trait]
impl PlatformBackend for LinuxBackend {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Linux
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
        self.tools.scan(device, settings).await
    }
}

#[cfg(test)]
mod tests {
    use easyprinter_core::error::EasyPrinterError;

    use super::*;

    #[tokio::test]
    async fn failed_scan_falls_back_to_manual_scanning() {
        let temp = tempfile::tempdir().expect("tempdir");
        let backend = LinuxBackend::new(Timeouts::default(), temp.path().join("gone"));
        let err = backend
            .scan_document(None, &ScanSettings::default())
            .await
            .expect_err("scan must fail");
        assert!(
            matches!(err, EasyPrinterError::ManualScanRequired(_)),
            "{err:?}"
        );
    }
}
