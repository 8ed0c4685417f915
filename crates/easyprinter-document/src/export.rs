// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Writing scanned images to disk in the user's chosen format.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use easyprinter_core::error::{EasyPrinterError, Result};
use easyprinter_core::settings::{PaperSize, ScanFormat};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tracing::{info, instrument};

use crate::pdf::PdfWriter;

/// JPEG quality for saved scans.
pub const JPEG_QUALITY: u8 = 95;

/// Save `image` to `path` as `format`, creating parent directories.
/// `dpi` sizes the PDF page content.
#[instrument(skip(image), fields(path = %path.display(), format = ?format))]
pub fn save_image(image: &DynamicImage, format: ScanFormat, path: &Path, dpi: u32) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    match format {
        ScanFormat::Pdf => {
            let rgb = flatten_on_white(image);
            let bytes = PdfWriter::new(PaperSize::A4)
                .with_dpi(dpi)
                .create_from_image(&rgb);
            std::fs::write(path, bytes)?;
        }
        ScanFormat::Jpeg => {
            let rgb = flatten_on_white(image);
            let mut writer = BufWriter::new(File::create(path)?);
            let encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
            rgb.write_with_encoder(encoder).map_err(|err| {
                EasyPrinterError::ImageError(format!("JPEG encoding failed: {err}"))
            })?;
        }
        ScanFormat::Png => encode(image, path, ImageFormat::Png)?,
        ScanFormat::Tiff => encode(image, path, ImageFormat::Tiff)?,
    }

    info!("Saved scan");
    Ok(())
}

fn encode(image: &DynamicImage, path: &Path, format: ImageFormat) -> Result<()> {
    image.save_with_format(path, format).map_err(|err| {
        EasyPrinterError::ImageError(format!("failed to save {}: {err}", path.display()))
    })
}

/// Composite any alpha channel onto white and drop it.
pub fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}
