// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Seam between the job pipeline and pixel-adjustment math.

use easyprinter_core::settings::ImageAdjustments;
use image::DynamicImage;

use crate::image::ImageProcessor;

/// Applies brightness/contrast/sharpness/gamma and scaling to images on
/// their way to the printer or out of the scanner.
pub trait ImageAdjuster: Send + Sync {
    fn apply_adjustments(&self, image: DynamicImage, params: &ImageAdjustments) -> DynamicImage;

    /// Scale both sides by `percent`.
    fn scale(&self, image: DynamicImage, percent: u32) -> DynamicImage;
}

/// [`ImageAdjuster`] backed by [`ImageProcessor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAdjuster;

impl ImageAdjuster for DefaultAdjuster {
    fn apply_adjustments(&self, image: DynamicImage, params: &ImageAdjustments) -> DynamicImage {
        ImageProcessor::from_dynamic(image).apply(params).into_dynamic()
    }

    fn scale(&self, image: DynamicImage, percent: u32) -> DynamicImage {
        ImageProcessor::from_dynamic(image)
            .scale_percent(percent)
            .into_dynamic()
    }
}
