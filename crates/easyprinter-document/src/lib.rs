// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// easyprinter-document: image adjustment and scan export.
//
// Provides the image adjustment seam used before printing and after
// scanning, and writers for the scan output formats (PDF, JPEG, PNG, TIFF).

pub mod adjust;
pub mod export;
pub mod image;
pub mod pdf;

pub use adjust::{DefaultAdjuster, ImageAdjuster};
pub use export::save_image;
pub use crate::image::processor::ImageProcessor;
pub use crate::pdf::writer::PdfWriter;
