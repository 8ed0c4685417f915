// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use easyprinter_core::settings::{
    DuplexMode, ImageAdjustments, Orientation, PageRange, PaperSize, PrintQuality, PrintSettings,
    ScanColorMode, ScanFormat, ScanResolution, ScanSettings, ScanSource,
};

/// easyprinter: print, scan, and copy on the office printer.
#[derive(Parser, Debug)]
#[command(name = "easyprinter", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON for scripting
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the printer once and show its status
    Status,

    /// Keep polling and print every status change until Ctrl-C
    Watch,

    /// List installed printers and scanners
    List,

    /// Print a PDF or image file
    Print(PrintArgs),

    /// Scan one page to a file
    Scan(ScanArgs),

    /// Scan one page and print it
    Copy(CopyArgs),

    /// Show the configuration file location and contents
    Config {
        /// Write the current configuration to disk
        #[arg(long)]
        write: bool,
    },
}

#[derive(Args, Debug)]
pub struct PrintArgs {
    /// File to print (pdf, jpg, png, bmp, tiff, gif)
    pub file: PathBuf,

    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=99))]
    pub copies: u32,

    #[arg(long, value_enum, default_value_t = PaperArg::A4)]
    pub paper: PaperArg,

    #[arg(long, value_enum, default_value_t = DuplexArg::Off)]
    pub duplex: DuplexArg,

    #[arg(long, value_enum, default_value_t = QualityArg::Normal)]
    pub quality: QualityArg,

    /// Pages to print, e.g. "3" or "2-5"
    #[arg(long)]
    pub pages: Option<String>,

    /// Pages per sheet
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=16))]
    pub per_sheet: u32,

    /// Image scale in percent
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(25..=400))]
    pub scale: u32,

    #[arg(long)]
    pub landscape: bool,

    #[command(flatten)]
    pub adjust: AdjustArgs,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Output folder (default: ~/Documents)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// File name without extension (default: timestamped)
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long = "as", value_enum, default_value_t = FileFormatArg::Pdf)]
    pub file_format: FileFormatArg,

    #[command(flatten)]
    pub scanner: ScannerArgs,

    #[command(flatten)]
    pub adjust: AdjustArgs,
}

#[derive(Args, Debug)]
pub struct CopyArgs {
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=99))]
    pub copies: u32,

    #[arg(long, value_enum, default_value_t = PaperArg::A4)]
    pub paper: PaperArg,

    /// Copy scale in percent
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(25..=400))]
    pub scale: u32,

    #[command(flatten)]
    pub scanner: ScannerArgs,

    #[command(flatten)]
    pub adjust: AdjustArgs,
}

#[derive(Args, Debug)]
pub struct ScannerArgs {
    #[arg(long, value_enum, default_value_t = DpiArg::Dpi300)]
    pub dpi: DpiArg,

    #[arg(long, value_enum, default_value_t = ModeArg::Color)]
    pub mode: ModeArg,

    /// Feed from the document feeder instead of the glass
    #[arg(long)]
    pub adf: bool,
}

#[derive(Args, Debug)]
pub struct AdjustArgs {
    #[arg(long, default_value_t = 0, allow_negative_numbers = true, value_parser = clap::value_parser!(i32).range(-100..=100))]
    pub brightness: i32,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true, value_parser = clap::value_parser!(i32).range(-100..=100))]
    pub contrast: i32,

    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(i32).range(0..=100))]
    pub sharpness: i32,

    #[arg(long, default_value_t = 1.0)]
    pub gamma: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PaperArg {
    A4,
    Letter,
    Legal,
    A5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DuplexArg {
    Off,
    Long,
    Short,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum QualityArg {
    Draft,
    Normal,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FileFormatArg {
    Pdf,
    Jpeg,
    Png,
    Tiff,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DpiArg {
    #[value(name = "150")]
    Dpi150,
    #[value(name = "300")]
    Dpi300,
    #[value(name = "600")]
    Dpi600,
    #[value(name = "1200")]
    Dpi1200,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Color,
    Gray,
    Lineart,
}

impl From<PaperArg> for PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A4 => Self::A4,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::A5 => Self::A5,
        }
    }
}

impl AdjustArgs {
    pub fn to_adjustments(&self) -> ImageAdjustments {
        ImageAdjustments {
            brightness: self.brightness,
            contrast: self.contrast,
            sharpness: self.sharpness,
            gamma: self.gamma.clamp(0.1, 3.0),
        }
    }
}

impl PrintArgs {
    pub fn to_settings(&self) -> PrintSettings {
        PrintSettings {
            copies: self.copies,
            paper_size: self.paper.into(),
            quality: match self.quality {
                QualityArg::Draft => PrintQuality::Draft,
                QualityArg::Normal => PrintQuality::Normal,
                QualityArg::High => PrintQuality::High,
            },
            duplex: match self.duplex {
                DuplexArg::Off => DuplexMode::Simplex,
                DuplexArg::Long => DuplexMode::LongEdge,
                DuplexArg::Short => DuplexMode::ShortEdge,
            },
            page_range: self.pages.as_deref().map(PageRange::parse),
            pages_per_sheet: self.per_sheet,
            scale: self.scale,
            orientation: if self.landscape {
                Orientation::Landscape
            } else {
                Orientation::Portrait
            },
            image_adjustments: self.adjust.to_adjustments(),
            ..PrintSettings::default()
        }
    }
}

impl CopyArgs {
    /// Adjustments are applied to the scan; the print side only scales.
    pub fn to_settings(&self) -> (ScanSettings, PrintSettings) {
        let scan = self.scanner.to_settings(&self.adjust);
        let print = PrintSettings {
            paper_size: self.paper.into(),
            scale: self.scale,
            ..PrintSettings::default()
        };
        (scan, print)
    }
}

impl ScannerArgs {
    /// Scan settings with this device configuration and defaults elsewhere.
    pub fn to_settings(&self, adjust: &AdjustArgs) -> ScanSettings {
        ScanSettings {
            resolution: match self.dpi {
                DpiArg::Dpi150 => ScanResolution::Dpi150,
                DpiArg::Dpi300 => ScanResolution::Dpi300,
                DpiArg::Dpi600 => ScanResolution::Dpi600,
                DpiArg::Dpi1200 => ScanResolution::Dpi1200,
            },
            color_mode: match self.mode {
                ModeArg::Color => ScanColorMode::Color,
                ModeArg::Gray => ScanColorMode::Gray,
                ModeArg::Lineart => ScanColorMode::Lineart,
            },
            source: if self.adf {
                ScanSource::Adf
            } else {
                ScanSource::Flatbed
            },
            image_adjustments: adjust.to_adjustments(),
            ..ScanSettings::default()
        }
    }
}

impl ScanArgs {
    pub fn to_settings(&self) -> ScanSettings {
        let mut settings = self.scanner.to_settings(&self.adjust);
        settings.format = match self.file_format {
            FileFormatArg::Pdf => ScanFormat::Pdf,
            FileFormatArg::Jpeg => ScanFormat::Jpeg,
            FileFormatArg::Png => ScanFormat::Png,
            FileFormatArg::Tiff => ScanFormat::Tiff,
        };
        if let Some(folder) = &self.output {
            settings.output_folder = folder.clone();
        }
        if let Some(name) = &self.name {
            settings.file_name = name.clone();
        }
        settings
    }
}
