// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job dispatcher: print, scan, and copy pipelines on top of the platform
// backend.
//
// Pixel work (decode, adjust, scale, encode) runs on the blocking pool.
// Intermediate images are written to temporary PNG files that are removed
// when the job returns, whether it succeeded or not.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat};
use tempfile::TempPath;
use tracing::{debug, info, instrument};

use easyprinter_bridge::PlatformBackend;
use easyprinter_core::config::DeviceConfig;
use easyprinter_core::error::{EasyPrinterError, Result};
use easyprinter_core::settings::{ImageAdjustments, PrintSettings, ScanSettings};
use easyprinter_core::types::DocumentKind;
use easyprinter_document::{DefaultAdjuster, ImageAdjuster, ImageProcessor, save_image};

use crate::discovery::DeviceDiscovery;

/// Receives `(message, percent)` milestones while a job runs.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, message: &str, percent: u8);
}

impl<F> ProgressReporter for F
where
    F: Fn(&str, u8) + Send + Sync,
{
    fn report(&self, message: &str, percent: u8) {
        self(message, percent)
    }
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _message: &str, _percent: u8) {}
}

pub struct JobDispatcher {
    backend: Arc<dyn PlatformBackend>,
    discovery: DeviceDiscovery,
    adjuster: Arc<dyn ImageAdjuster>,
    temp_dir: PathBuf,
}

impl JobDispatcher {
    pub fn new(
        backend: Arc<dyn PlatformBackend>,
        discovery: DeviceDiscovery,
        adjuster: Arc<dyn ImageAdjuster>,
        temp_dir: PathBuf,
    ) -> Self {
        Self {
            backend,
            discovery,
            adjuster,
            temp_dir,
        }
    }

    /// Dispatcher with the default image adjuster.
    pub fn from_config(backend: Arc<dyn PlatformBackend>, config: &DeviceConfig) -> Self {
        let discovery = DeviceDiscovery::new(Arc::clone(&backend), config);
        Self::new(backend, discovery, Arc::new(DefaultAdjuster), config.temp_dir())
    }

    /// Print a PDF or image file on the target device.
    ///
    /// Images are adjusted and scaled into a temporary PNG first; documents
    /// go to the spooler unchanged.
    #[instrument(skip_all, fields(path = %path.display(), copies = settings.copies))]
    pub async fn print_file(
        &self,
        path: &Path,
        settings: &PrintSettings,
        progress: &dyn ProgressReporter,
    ) -> Result<()> {
        let kind = DocumentKind::from_path(path).ok_or_else(|| {
            EasyPrinterError::UnsupportedFormat(
                path.extension()
                    .map(|ext| ext.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            )
        })?;

        progress.report("Поиск принтера...", 10);
        let printer = self
            .discovery
            .find_target_device()
            .await
            .ok_or(EasyPrinterError::DeviceNotFound)?;

        progress.report("Подготовка документа...", 50);
        match kind {
            DocumentKind::Document => {
                tokio::fs::metadata(path).await?;
                progress.report("Отправка на печать...", 80);
                self.backend
                    .print_document(&printer, path, kind, settings)
                    .await?;
            }
            DocumentKind::Image => {
                let prepared = self.prepare_image(path, settings).await?;
                debug!(temp = %prepared.display(), "image prepared for printing");
                progress.report("Отправка на печать...", 80);
                self.backend
                    .print_document(&printer, &prepared, kind, settings)
                    .await?;
            }
        }

        progress.report("Печать успешно отправлена", 100);
        info!(printer = %printer, "print job sent");
        Ok(())
    }

    /// Scan one page from the target scanner and return it adjusted.
    #[instrument(skip_all, fields(dpi = settings.resolution.dpi()))]
    pub async fn scan_to_image(
        &self,
        settings: &ScanSettings,
        progress: &dyn ProgressReporter,
    ) -> Result<DynamicImage> {
        progress.report("Поиск сканера...", 10);
        let scanner = self.discovery.find_target_scanner().await;

        progress.report("Сканирование...", 30);
        let bytes = self
            .backend
            .scan_document(scanner.as_deref(), settings)
            .await?;

        progress.report("Обработка изображения...", 70);
        let adjuster = Arc::clone(&self.adjuster);
        let adjustments = settings.image_adjustments;
        let image = blocking(move || {
            let image = ImageProcessor::from_bytes(&bytes)?.into_dynamic();
            Ok(if adjustments.has_changes() {
                adjuster.apply_adjustments(image, &adjustments)
            } else {
                image
            })
        })
        .await?;

        progress.report("Сканирование завершено", 100);
        info!(width = image.width(), height = image.height(), "scan complete");
        Ok(image)
    }

    /// Write a scanned image to `settings.full_path()` in the chosen format.
    pub async fn save_scanned_image(
        &self,
        image: DynamicImage,
        settings: &ScanSettings,
    ) -> Result<PathBuf> {
        let path = settings.full_path();
        let format = settings.format;
        let dpi = settings.resolution.dpi();
        blocking(move || {
            save_image(&image, format, &path, dpi)?;
            Ok(path)
        })
        .await
    }

    /// Scan one page and print it `copies` times. Image adjustments come
    /// from `scan_settings` and are applied once, at scan time; only the
    /// print-side scale is applied on top.
    #[instrument(skip_all, fields(copies = copies))]
    pub async fn copy(
        &self,
        scan_settings: &ScanSettings,
        print_settings: &PrintSettings,
        copies: u32,
        progress: &dyn ProgressReporter,
    ) -> Result<()> {
        progress.report("Сканирование документа...", 20);
        let image = self.scan_to_image(scan_settings, &NoProgress).await?;

        progress.report("Подготовка к печати...", 50);
        let temp_dir = self.temp_dir.clone();
        let scanned = blocking(move || write_temp_png(&image, &temp_dir)).await?;

        progress.report("Печать копии...", 80);
        let settings = PrintSettings {
            copies: copies.max(1),
            image_adjustments: ImageAdjustments::default(),
            ..print_settings.clone()
        };
        self.print_file(&scanned, &settings, &NoProgress).await?;

        progress.report("Копирование завершено", 100);
        Ok(())
    }

    async fn prepare_image(&self, path: &Path, settings: &PrintSettings) -> Result<TempPath> {
        let source = path.to_path_buf();
        let adjuster = Arc::clone(&self.adjuster);
        let adjustments = settings.image_adjustments;
        let scale = settings.scale;
        let temp_dir = self.temp_dir.clone();

        blocking(move || {
            let mut image = ImageProcessor::open(&source)?.into_dynamic();
            if adjustments.has_changes() {
                image = adjuster.apply_adjustments(image, &adjustments);
            }
            if scale != 100 {
                image = adjuster.scale(image, scale);
            }
            write_temp_png(&image, &temp_dir)
        })
        .await
    }
}

/// Encode `image` as PNG into a fresh temporary file, removed when the
/// returned path is dropped.
fn write_temp_png(image: &DynamicImage, dir: &Path) -> Result<TempPath> {
    std::fs::create_dir_all(dir)?;
    let mut file = tempfile::Builder::new()
        .prefix("easyprinter-")
        .suffix(".png")
        .tempfile_in(dir)?;
    image
        .write_to(&mut file, ImageFormat::Png)
        .map_err(|err| EasyPrinterError::ImageError(format!("PNG encoding failed: {err}")))?;
    Ok(file.into_temp_path())
}

async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| EasyPrinterError::ImageError(format!("image worker failed: {err}")))?
}
