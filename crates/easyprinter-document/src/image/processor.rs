// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: scaling plus brightness, contrast, gamma and sharpness.
// Operates on in-memory images using the `image` and `imageproc` crates.

use easyprinter_core::error::{EasyPrinterError, Result};
use easyprinter_core::settings::ImageAdjustments;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::filter::gaussian_blur_f32;
use tracing::{debug, info, instrument};

/// Image processing pipeline operating on a single in-memory image.
///
/// Each method consumes `self` and returns a new `ImageProcessor` wrapping
/// the transformed image, enabling method chaining.
///
/// ```ignore
/// let result = ImageProcessor::open("photo.jpg")?
///     .scale_percent(50)
///     .adjust_brightness(10)
///     .to_png_bytes()?;
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| {
            EasyPrinterError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Create a processor from raw encoded bytes (PNG, BMP, JPEG, ...).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| EasyPrinterError::ImageError(format!("failed to decode image: {err}")))?;
        debug!(width = img.width(), height = img.height(), "Image decoded from bytes");
        Ok(Self { image: img })
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Scale both sides by `percent` (100 is a no-op) with Lanczos3 filtering.
    /// Sides never shrink below one pixel.
    #[instrument(skip(self), fields(percent))]
    pub fn scale_percent(self, percent: u32) -> Self {
        if percent == 100 || percent == 0 {
            return self;
        }
        let new_w = ((u64::from(self.image.width()) * u64::from(percent)) / 100).max(1) as u32;
        let new_h = ((u64::from(self.image.height()) * u64::from(percent)) / 100).max(1) as u32;
        info!(from_w = self.image.width(), from_h = self.image.height(), new_w, new_h, "Scaling image");
        Self {
            image: self
                .image
                .resize_exact(new_w, new_h, image::imageops::FilterType::Lanczos3),
        }
    }

    /// Brightness in -100..=100. Channels are multiplied by `1 + value/100`,
    /// so -100 is black and 100 doubles every channel.
    #[instrument(skip(self), fields(value))]
    pub fn adjust_brightness(self, value: i32) -> Self {
        let factor = 1.0 + value.clamp(-100, 100) as f32 / 100.0;
        info!(factor, "Adjusting brightness");
        self.map_channels(|c| c * factor)
    }

    /// Contrast in -100..=100. Channels are pulled toward (or pushed away
    /// from) the image's mean luminance by `1 + value/100`.
    #[instrument(skip(self), fields(value))]
    pub fn adjust_contrast(self, value: i32) -> Self {
        let factor = 1.0 + value.clamp(-100, 100) as f32 / 100.0;
        let mean = mean_luma(&self.image);
        info!(factor, mean, "Adjusting contrast");
        self.map_channels(|c| mean + factor * (c - mean))
    }

    /// Gamma correction through a 256-entry table: `out = (in/255)^(1/gamma)`.
    #[instrument(skip(self), fields(gamma))]
    pub fn adjust_gamma(self, gamma: f32) -> Self {
        let gamma = gamma.clamp(0.1, 3.0);
        let inv = 1.0 / gamma;
        let table: Vec<u8> = (0..=255u16)
            .map(|i| ((f32::from(i) / 255.0).powf(inv) * 255.0).clamp(0.0, 255.0) as u8)
            .collect();
        info!(gamma, "Adjusting gamma");

        let mut rgba = self.image.to_rgba8();
        for pixel in rgba.pixels_mut() {
            let Rgba([r, g, b, a]) = *pixel;
            *pixel = Rgba([
                table[usize::from(r)],
                table[usize::from(g)],
                table[usize::from(b)],
                a,
            ]);
        }
        Self {
            image: DynamicImage::ImageRgba8(rgba),
        }
    }

    /// Sharpness in 0..=100. Blends away from a Gaussian-blurred copy by
    /// `1 + amount/50`; 0 is a no-op.
    #[instrument(skip(self), fields(amount))]
    pub fn sharpen(self, amount: i32) -> Self {
        if amount <= 0 {
            return self;
        }
        let factor = 1.0 + amount.min(100) as f32 / 50.0;
        info!(factor, "Sharpening image");

        let original = self.image.to_rgba8();
        let blurred = gaussian_blur_f32(&original, 1.0);
        let sharpened = RgbaImage::from_fn(original.width(), original.height(), |x, y| {
            let Rgba([r, g, b, a]) = *original.get_pixel(x, y);
            let Rgba([br, bg, bb, _]) = *blurred.get_pixel(x, y);
            let mix = |orig: u8, blur: u8| -> u8 {
                let blur = f32::from(blur);
                (blur + factor * (f32::from(orig) - blur)).clamp(0.0, 255.0) as u8
            };
            Rgba([mix(r, br), mix(g, bg), mix(b, bb), a])
        });
        Self {
            image: DynamicImage::ImageRgba8(sharpened),
        }
    }

    /// Apply a full adjustment set: brightness, contrast, gamma, then
    /// sharpness. Identity parameters leave the image untouched.
    pub fn apply(self, params: &ImageAdjustments) -> Self {
        let mut processor = self;
        if params.brightness != 0 {
            processor = processor.adjust_brightness(params.brightness);
        }
        if params.contrast != 0 {
            processor = processor.adjust_contrast(params.contrast);
        }
        if (params.gamma - 1.0).abs() > 0.01 {
            processor = processor.adjust_gamma(params.gamma);
        }
        processor.sharpen(params.sharpness)
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| EasyPrinterError::ImageError(format!("image encoding failed: {err}")))?;
        Ok(buffer)
    }

    /// Per-channel float mapping over RGB; alpha is preserved.
    fn map_channels(self, f: impl Fn(f32) -> f32) -> Self {
        let mut rgba = self.image.to_rgba8();
        for pixel in rgba.pixels_mut() {
            let Rgba([r, g, b, a]) = *pixel;
            let adjust = |channel: u8| f(f32::from(channel)).clamp(0.0, 255.0) as u8;
            *pixel = Rgba([adjust(r), adjust(g), adjust(b), a]);
        }
        Self {
            image: DynamicImage::ImageRgba8(rgba),
        }
    }
}

fn mean_luma(image: &DynamicImage) -> f32 {
    let luma = image.to_luma8();
    let count = u64::from(luma.width()) * u64::from(luma.height());
    if count == 0 {
        return 128.0;
    }
    let sum: u64 = luma.pixels().map(|p| u64::from(p.0[0])).sum();
    sum as f32 / count as f32
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    fn solid(r: u8, g: u8, b: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([r, g, b])))
    }

    fn first_pixel(processor: ImageProcessor) -> [u8; 4] {
        processor.into_dynamic().to_rgba8().get_pixel(0, 0).0
    }

    #[test]
    fn brightness_scales_channels() {
        let out = first_pixel(ImageProcessor::from_dynamic(solid(100, 50, 200)).adjust_brightness(50));
        assert_eq!(out, [150, 75, 255, 255]);
        let black = first_pixel(ImageProcessor::from_dynamic(solid(100, 50, 200)).adjust_brightness(-100));
        assert_eq!(black, [0, 0, 0, 255]);
    }

    #[test]
    fn gamma_brightens_midtones() {
        let out = first_pixel(ImageProcessor::from_dynamic(solid(64, 64, 64)).adjust_gamma(2.0));
        assert!(out[0] > 64);
    }

    #[test]
    fn identity_adjustments_keep_pixels() {
        let img = solid(10, 20, 30);
        let out = ImageProcessor::from_dynamic(img.clone())
            .apply(&ImageAdjustments::default())
            .into_dynamic();
        assert_eq!(out.to_rgb8(), img.to_rgb8());
    }

    #[test]
    fn sharpen_leaves_flat_image_flat() {
        let out = first_pixel(ImageProcessor::from_dynamic(solid(90, 90, 90)).sharpen(80));
        assert!((i32::from(out[0]) - 90).abs() <= 1);
    }

    #[test]
    fn scale_percent_resizes() {
        let processor = ImageProcessor::from_dynamic(solid(0, 0, 0)).scale_percent(50);
        assert_eq!((processor.width(), processor.height()), (4, 4));
        let tiny = ImageProcessor::from_dynamic(solid(0, 0, 0)).scale_percent(1);
        assert_eq!((tiny.width(), tiny.height()), (1, 1));
    }

    #[test]
    fn png_round_trip_decodes() {
        let bytes = ImageProcessor::from_dynamic(solid(1, 2, 3))
            .to_png_bytes()
            .expect("encode");
        let decoded = ImageProcessor::from_bytes(&bytes).expect("decode");
        assert_eq!(decoded.width(), 8);
    }
}
