// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print and scan settings. The core only reads these to build command lines;
// validation happens in whatever layer collects them from the user.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Paper sizes supported by the target device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
    Legal,
    A5,
    Envelope10,
    EnvelopeC5,
    EnvelopeDl,
}

impl PaperSize {
    /// CUPS `media` keyword.
    pub fn media_name(&self) -> &'static str {
        match self {
            Self::A4 => "A4",
            Self::Letter => "Letter",
            Self::Legal => "Legal",
            Self::A5 => "A5",
            Self::Envelope10 => "Env10",
            Self::EnvelopeC5 => "EnvC5",
            Self::EnvelopeDl => "EnvDL",
        }
    }

    /// Width and height in millimetres, portrait.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
            Self::A5 => (148.0, 210.0),
            Self::Envelope10 => (104.8, 241.3),
            Self::EnvelopeC5 => (162.0, 229.0),
            Self::EnvelopeDl => (110.0, 220.0),
        }
    }
}

/// Input tray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaperSource {
    #[default]
    Auto,
    Tray1,
    ManualFeed,
}

impl PaperSource {
    /// PPD `InputSlot` value; `None` lets the driver pick.
    pub fn input_slot(&self) -> Option<&'static str> {
        match self {
            Self::Auto => None,
            Self::Tray1 => Some("Tray1"),
            Self::ManualFeed => Some("ManualFeed"),
        }
    }
}

/// Print quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrintQuality {
    /// 600 dpi economode.
    Draft,
    #[default]
    Normal,
    /// FastRes 1200.
    High,
}

impl PrintQuality {
    /// IPP `print-quality` enum value (RFC 8011 §5.2.13).
    pub fn ipp_value(&self) -> u8 {
        match self {
            Self::Draft => 3,
            Self::Normal => 4,
            Self::High => 5,
        }
    }
}

/// Duplex printing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuplexMode {
    #[default]
    Simplex,
    LongEdge,
    ShortEdge,
}

impl DuplexMode {
    /// IPP `sides` keyword (RFC 8011 §5.2.8).
    pub fn sides_keyword(&self) -> &'static str {
        match self {
            Self::Simplex => "one-sided",
            Self::LongEdge => "two-sided-long-edge",
            Self::ShortEdge => "two-sided-short-edge",
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Inclusive page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    /// Range used when the user's input can't be understood: every page.
    pub const ALL: Self = Self { start: 1, end: 9999 };

    /// Parse `"N"` or `"N-M"`. Unparseable input falls back to [`Self::ALL`]
    /// so a typo never blocks a print.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let parsed = match input.split_once('-') {
            Some((from, to)) => from
                .trim()
                .parse()
                .ok()
                .zip(to.trim().parse().ok())
                .map(|(start, end)| Self { start, end }),
            None => input.parse().ok().map(|page| Self { start: page, end: page }),
        };
        parsed.unwrap_or(Self::ALL)
    }

    /// CUPS `page-ranges` value.
    pub fn cups_value(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

/// Brightness / contrast / sharpness / gamma applied to images before
/// printing and after scanning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageAdjustments {
    /// -100..=100.
    pub brightness: i32,
    /// -100..=100.
    pub contrast: i32,
    /// 0..=100.
    pub sharpness: i32,
    /// 0.1..=3.0.
    pub gamma: f32,
}

impl Default for ImageAdjustments {
    fn default() -> Self {
        Self {
            brightness: 0,
            contrast: 0,
            sharpness: 0,
            gamma: 1.0,
        }
    }
}

impl ImageAdjustments {
    /// Whether anything differs from the identity adjustment.
    pub fn has_changes(&self) -> bool {
        self.brightness != 0
            || self.contrast != 0
            || self.sharpness != 0
            || (self.gamma - 1.0).abs() > 0.01
    }
}

/// Settings for one print job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintSettings {
    /// 1–99.
    pub copies: u32,
    pub paper_size: PaperSize,
    pub paper_source: PaperSource,
    pub quality: PrintQuality,
    pub duplex: DuplexMode,
    /// `None` prints every page.
    pub page_range: Option<PageRange>,
    pub pages_per_sheet: u32,
    /// Percent, 25–400. Only applied to images.
    pub scale: u32,
    pub orientation: Orientation,
    pub image_adjustments: ImageAdjustments,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            copies: 1,
            paper_size: PaperSize::A4,
            paper_source: PaperSource::Auto,
            quality: PrintQuality::Normal,
            duplex: DuplexMode::Simplex,
            page_range: None,
            pages_per_sheet: 1,
            scale: 100,
            orientation: Orientation::Portrait,
            image_adjustments: ImageAdjustments::default(),
        }
    }
}

/// Scan resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanResolution {
    Dpi150,
    #[default]
    Dpi300,
    Dpi600,
    Dpi1200,
}

impl ScanResolution {
    pub fn dpi(&self) -> u32 {
        match self {
            Self::Dpi150 => 150,
            Self::Dpi300 => 300,
            Self::Dpi600 => 600,
            Self::Dpi1200 => 1200,
        }
    }
}

/// Output file format for saved scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanFormat {
    #[default]
    Pdf,
    Jpeg,
    Png,
    Tiff,
}

impl ScanFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Tiff => "tiff",
        }
    }
}

/// Where the scanner pulls the page from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanSource {
    #[default]
    Flatbed,
    /// Automatic document feeder.
    Adf,
}

/// Colour mode requested from the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanColorMode {
    #[default]
    Color,
    Gray,
    Lineart,
}

impl ScanColorMode {
    /// SANE `--mode` value.
    pub fn sane_mode(&self) -> &'static str {
        match self {
            Self::Color => "Color",
            Self::Gray => "Gray",
            Self::Lineart => "Lineart",
        }
    }

    /// WIA "Current Intent" property value (1 = colour, 2 = grayscale,
    /// 4 = text).
    pub fn wia_intent(&self) -> u8 {
        match self {
            Self::Color => 1,
            Self::Gray => 2,
            Self::Lineart => 4,
        }
    }
}

/// Settings for one scan job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSettings {
    pub resolution: ScanResolution,
    pub format: ScanFormat,
    pub output_folder: PathBuf,
    /// File stem; the extension comes from `format`.
    pub file_name: String,
    pub source: ScanSource,
    pub color_mode: ScanColorMode,
    pub image_adjustments: ImageAdjustments,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            resolution: ScanResolution::Dpi300,
            format: ScanFormat::Pdf,
            output_folder: default_scan_folder(),
            file_name: chrono::Local::now()
                .format("Скан_%Y-%m-%d_%H-%M-%S")
                .to_string(),
            source: ScanSource::Flatbed,
            color_mode: ScanColorMode::Color,
            image_adjustments: ImageAdjustments::default(),
        }
    }
}

impl ScanSettings {
    /// `output_folder/file_name.<ext>`.
    pub fn full_path(&self) -> PathBuf {
        self.output_folder
            .join(format!("{}.{}", self.file_name, self.format.extension()))
    }
}

fn default_scan_folder() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join("Documents")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_range_parses_single_and_span() {
        assert_eq!(PageRange::parse("3"), PageRange { start: 3, end: 3 });
        assert_eq!(PageRange::parse(" 2 - 7 "), PageRange { start: 2, end: 7 });
    }

    #[test]
    fn page_range_garbage_means_all_pages() {
        assert_eq!(PageRange::parse("abc"), PageRange::ALL);
        assert_eq!(PageRange::parse("1-x"), PageRange::ALL);
        assert_eq!(PageRange::parse(""), PageRange::ALL);
        assert_eq!(PageRange::ALL.cups_value(), "1-9999");
    }

    #[test]
    fn default_adjustments_have_no_changes() {
        assert!(!ImageAdjustments::default().has_changes());
        let gamma_only = ImageAdjustments {
            gamma: 1.4,
            ..ImageAdjustments::default()
        };
        assert!(gamma_only.has_changes());
        let tiny_gamma = ImageAdjustments {
            gamma: 1.005,
            ..ImageAdjustments::default()
        };
        assert!(!tiny_gamma.has_changes());
    }

    #[test]
    fn scan_full_path_uses_format_extension() {
        let settings = ScanSettings {
            output_folder: PathBuf::from("/scans"),
            file_name: "invoice".into(),
            format: ScanFormat::Jpeg,
            ..ScanSettings::default()
        };
        assert_eq!(settings.full_path(), PathBuf::from("/scans/invoice.jpg"));
    }

    #[test]
    fn media_and_sides_keywords() {
        assert_eq!(PaperSize::EnvelopeDl.media_name(), "EnvDL");
        assert_eq!(DuplexMode::LongEdge.sides_keyword(), "two-sided-long-edge");
        assert_eq!(PaperSource::Auto.input_slot(), None);
        assert_eq!(PrintQuality::High.ipp_value(), 5);
    }
}
