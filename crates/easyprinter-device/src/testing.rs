// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scriptable in-memory backend for unit tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use easyprinter_bridge::PlatformBackend;
use easyprinter_core::error::{EasyPrinterError, Result};
use easyprinter_core::settings::{PrintSettings, ScanSettings};
use easyprinter_core::types::{DocumentKind, PlatformKind};

/// What the backend saw when asked to print.
#[derive(Debug, Clone)]
pub struct PrintCall {
    pub printer: String,
    pub path: PathBuf,
    pub kind: DocumentKind,
    pub copies: u32,
    /// Whether `path` existed while the backend held it.
    pub existed: bool,
    /// Top-left pixel of the file when it decodes as an image.
    pub first_pixel: Option<[u8; 3]>,
}

#[derive(Default)]
pub struct FakeBackend {
    pub printers: Mutex<Vec<String>>,
    pub scanners: Vec<String>,
    pub raw_status: Mutex<String>,
    pub queue_depth: u32,
    pub listing_fails: bool,
    pub status_panics: bool,
    pub status_hangs: bool,
    pub print_fails: bool,
    pub print_panics: bool,
    /// Bytes returned by a scan; `None` means the scanner is unusable.
    pub scan_bytes: Option<Vec<u8>>,
    pub printed: Mutex<Vec<PrintCall>>,
}

impl FakeBackend {
    pub fn with_printer(name: &str, raw_status: &str) -> Self {
        Self {
            printers: Mutex::new(vec![name.to_string()]),
            raw_status: Mutex::new(raw_status.to_string()),
            ..Self::default()
        }
    }

    pub fn set_raw_status(&self, raw: &str) {
        *self.raw_status.lock().expect("status lock") = raw.to_string();
    }

    pub fn set_printers(&self, names: &[&str]) {
        *self.printers.lock().expect("printers lock") =
            names.iter().map(|s| s.to_string()).collect();
    }

    pub fn print_calls(&self) -> Vec<PrintCall> {
        self.printed.lock().expect("printed lock").clone()
    }
}

#[async_trait]
impl PlatformBackend for FakeBackend {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Linux
    }

    async fn list_printers(&self) -> Result<Vec<String>> {
        if self.listing_fails {
            return Err(EasyPrinterError::BackendUnavailable("lpstat missing".into()));
        }
        Ok(self.printers.lock().expect("printers lock").clone())
    }

    async fn query_raw_status(&self, _printer: &str) -> Result<String> {
        if self.status_panics {
            panic!("status probe exploded");
        }
        if self.status_hangs {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(self.raw_status.lock().expect("status lock").clone())
    }

    async fn query_queue_depth(&self, _printer: &str) -> Result<u32> {
        Ok(self.queue_depth)
    }

    async fn list_scanners(&self) -> Result<Vec<String>> {
        if self.listing_fails {
            return Err(EasyPrinterError::BackendUnavailable("scanimage missing".into()));
        }
        Ok(self.scanners.clone())
    }

    async fn print_document(
        &self,
        printer: &str,
        path: &Path,
        kind: DocumentKind,
        settings: &PrintSettings,
    ) -> Result<()> {
        self.printed.lock().expect("printed lock").push(PrintCall {
            printer: printer.to_string(),
            path: path.to_path_buf(),
            kind,
            copies: settings.copies,
            existed: path.exists(),
            first_pixel: image::open(path)
                .ok()
                .map(|image| image.to_rgb8().get_pixel(0, 0).0),
        });
        if self.print_panics {
            panic!("print driver crashed");
        }
        if self.print_fails {
            return Err(EasyPrinterError::CommandFailed {
                program: "lpr".into(),
                code: Some(1),
                stderr: "printer on fire".into(),
            });
        }
        Ok(())
    }

    async fn scan_document(&self, _device: Option<&str>, _settings: &ScanSettings) -> Result<Vec<u8>> {
        self.scan_bytes
            .clone()
            .ok_or_else(|| EasyPrinterError::ManualScanRequired("no scanner".into()))
    }
}
