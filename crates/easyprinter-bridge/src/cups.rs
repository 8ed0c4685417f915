// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CUPS + SANE tool chain shared by the macOS and Linux backends.
//
// Printing goes through `lpr`, falling back to `lp`. Status comes from
// `lpstat`, scanning from `scanimage`.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use easyprinter_core::error::{EasyPrinterError, Result};
use easyprinter_core::settings::{
    DuplexMode, Orientation, PrintSettings, ScanSettings, ScanSource,
};
use easyprinter_core::types::DocumentKind;

use crate::command::{self, Timeouts};

/// File name the scanner writes into its scratch directory.
pub(crate) const SCAN_FILE_NAME: &str = "scan.png";

/// `lpstat`, `lpr`/`lp`, and `scanimage` bound to one set of timeouts.
#[derive(Debug, Clone)]
pub struct CupsTools {
    timeouts: Timeouts,
    temp_dir: PathBuf,
}

impl CupsTools {
    pub fn new(timeouts: Timeouts, temp_dir: PathBuf) -> Self {
        Self { timeouts, temp_dir }
    }

    pub async fn list_printers(&self) -> Result<Vec<String>> {
        let out = command::run_checked("lpstat", ["-a"], self.timeouts.command).await?;
        Ok(parse_lpstat_queues(&out.stdout))
    }

    pub async fn query_raw_status(&self, printer: &str) -> Result<String> {
        let out =
            command::run_checked("lpstat", ["-p", printer, "-l"], self.timeouts.command).await?;
        Ok(out.stdout)
    }

    pub async fn query_queue_depth(&self, printer: &str) -> Result<u32> {
        let out = command::run_checked("lpstat", ["-o", printer], self.timeouts.command).await?;
        Ok(count_queue_lines(&out.stdout))
    }

    pub async fn list_scanners(&self) -> Result<Vec<String>> {
        let out = command::run_checked("scanimage", ["-L"], self.timeouts.command).await?;
        Ok(parse_scanimage_devices(&out.stdout))
    }

    /// `lpr` first; if it is missing or fails, `lp` with the same options.
    #[instrument(skip_all, fields(printer = %printer, path = %path.display()))]
    pub async fn print(
        &self,
        printer: &str,
        path: &Path,
        kind: DocumentKind,
        settings: &PrintSettings,
    ) -> Result<()> {
        let primary = lpr_args(printer, path, kind, settings);
        match command::run_checked("lpr", &primary, self.timeouts.print).await {
            Ok(_) => {
                info!(copies = settings.copies, "submitted via lpr");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "lpr failed, falling back to lp");
                let fallback = lp_args(printer, path, kind, settings);
                command::run_checked("lp", &fallback, self.timeouts.print).await?;
                info!(copies = settings.copies, "submitted via lp");
                Ok(())
            }
        }
    }

    /// Scan into a scratch directory and return the PNG bytes. The directory
    /// is removed when this returns. Every failure is reported as
    /// [`EasyPrinterError::ManualScanRequired`].
    #[instrument(skip_all, fields(device = device.unwrap_or("default")))]
    pub async fn scan(&self, device: Option<&str>, settings: &ScanSettings) -> Result<Vec<u8>> {
        self.scan_with("scanimage", device, settings).await
    }

    async fn scan_with(
        &self,
        program: &str,
        device: Option<&str>,
        settings: &ScanSettings,
    ) -> Result<Vec<u8>> {
        let scratch = tempfile::Builder::new()
            .prefix("easyprinter-scan-")
            .tempdir_in(&self.temp_dir)
            .map_err(|e| manual_scan(format!("cannot create scan directory: {e}")))?;
        let out_path = scratch.path().join(SCAN_FILE_NAME);

        let args = scanimage_args(device, settings, &out_path);
        let out = command::run(program, &args, self.timeouts.scan)
            .await
            .map_err(|e| manual_scan(e.to_string()))?;
        if !out.success() {
            return Err(manual_scan(format!("{program} failed: {}", out.stderr)));
        }

        match tokio::fs::read(&out_path).await {
            Ok(bytes) if !bytes.is_empty() => Ok(bytes),
            Ok(_) => Err(manual_scan(format!("{program} produced an empty file"))),
            Err(e) => Err(manual_scan(format!("{program} produced no output: {e}"))),
        }
    }
}

fn manual_scan(detail: String) -> EasyPrinterError {
    warn!(%detail, "scan failed");
    EasyPrinterError::ManualScanRequired(detail)
}

/// Queue names from `lpstat -a` (`<queue> accepting requests since ...`).
pub fn parse_lpstat_queues(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// `lpstat -o` prints one line per pending job.
pub fn count_queue_lines(stdout: &str) -> u32 {
    let count = stdout.lines().filter(|line| !line.trim().is_empty()).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Device ids from `scanimage -L`
/// (``device `hpaio:/net/...' is a Hewlett-Packard ... flatbed scanner``).
pub fn parse_scanimage_devices(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| {
            let start = line.find('`')? + 1;
            let len = line[start..].find('\'')?;
            Some(line[start..start + len].to_string())
        })
        .filter(|name| !name.is_empty())
        .collect()
}

/// `-o` options common to `lpr` and `lp`.
fn cups_options(kind: DocumentKind, settings: &PrintSettings) -> Vec<String> {
    let mut opts = Vec::new();
    let mut push = |value: String| {
        opts.push("-o".to_string());
        opts.push(value);
    };

    if settings.orientation == Orientation::Landscape {
        push("landscape".into());
    }
    if kind == DocumentKind::Document {
        if let Some(range) = settings.page_range {
            push(format!("page-ranges={}", range.cups_value()));
        }
    }
    if settings.duplex != DuplexMode::Simplex {
        push(format!("sides={}", settings.duplex.sides_keyword()));
    }
    push(format!("media={}", settings.paper_size.media_name()));
    push(format!("print-quality={}", settings.quality.ipp_value()));
    if settings.pages_per_sheet > 1 {
        push(format!("number-up={}", settings.pages_per_sheet));
    }
    if let Some(slot) = settings.paper_source.input_slot() {
        push(format!("InputSlot={slot}"));
    }
    if kind == DocumentKind::Image {
        push("fit-to-page".into());
    }
    opts
}

/// `lpr -P <printer> [-# n] [-o ...] <file>`.
pub fn lpr_args(
    printer: &str,
    path: &Path,
    kind: DocumentKind,
    settings: &PrintSettings,
) -> Vec<String> {
    let mut args = vec!["-P".to_string(), printer.to_string()];
    if settings.copies > 1 {
        args.push("-#".into());
        args.push(settings.copies.to_string());
    }
    args.extend(cups_options(kind, settings));
    args.push(path.display().to_string());
    args
}

/// `lp -d <printer> [-n n] [-o ...] <file>`.
pub fn lp_args(
    printer: &str,
    path: &Path,
    kind: DocumentKind,
    settings: &PrintSettings,
) -> Vec<String> {
    let mut args = vec!["-d".to_string(), printer.to_string()];
    if settings.copies > 1 {
        args.push("-n".into());
        args.push(settings.copies.to_string());
    }
    args.extend(cups_options(kind, settings));
    args.push(path.display().to_string());
    args
}

/// `scanimage [-d dev] --resolution=N --mode=M [--source=ADF] --format=png -o <out>`.
pub fn scanimage_args(device: Option<&str>, settings: &ScanSettings, out: &Path) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(device) = device {
        args.push("-d".to_string());
        args.push(device.to_string());
    }
    args.push(format!("--resolution={}", settings.resolution.dpi()));
    args.push(format!("--mode={}", settings.color_mode.sane_mode()));
    if settings.source == ScanSource::Adf {
        args.push("--source=ADF".into());
    }
    args.push("--format=png".into());
    args.push("-o".into());
    args.push(out.display().to_string());
    args
}

#[cfg(test)]
mod tests {
    use easyprinter_core::settings::{PageRange, PaperSize, PaperSource, ScanColorMode, ScanResolution};

    use super::*;

    fn tools(temp_dir: PathBuf) -> CupsTools {
        CupsTools::new(Timeouts::default(), temp_dir)
    }

    #[tokio::test]
    async fn missing_scanner_tool_asks_for_manual_scan() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = tools(temp.path().to_path_buf())
            .scan_with("easyprinter-no-such-scanimage", None, &ScanSettings::default())
            .await
            .expect_err("scan must fail");
        match err {
            EasyPrinterError::ManualScanRequired(detail) => {
                assert!(detail.contains("not installed"), "{detail}")
            }
            other => panic!("expected ManualScanRequired, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unusable_scratch_dir_asks_for_manual_scan() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = tools(temp.path().join("missing").join("dir"))
            .scan(None, &ScanSettings::default())
            .await
            .expect_err("scan must fail");
        assert!(
            matches!(err, EasyPrinterError::ManualScanRequired(_)),
            "{err:?}"
        );
    }

    #[test]
    fn lpstat_queue_names() {
        let out = "HP_LaserJet_M1536dnf accepting requests since Mon 01 Jan 2024\n\
                   Office_PDF accepting requests since Tue 02 Jan 2024\n\n";
        assert_eq!(
            parse_lpstat_queues(out),
            vec!["HP_LaserJet_M1536dnf", "Office_PDF"]
        );
        assert!(parse_lpstat_queues("").is_empty());
    }

    #[test]
    fn queue_depth_counts_job_lines() {
        let out = "HP-12 alice 1024 Mon 01 Jan\nHP-13 bob 2048 Mon 01 Jan\n\n";
        assert_eq!(count_queue_lines(out), 2);
        assert_eq!(count_queue_lines(""), 0);
    }

    #[test]
    fn scanimage_device_ids() {
        let out = "device `hpaio:/net/HP_LaserJet_M1536dnf_MFP?ip=192.168.1.20' is a Hewlett-Packard HP_LaserJet_M1536dnf_MFP all-in-one\n\
                   No scanners were identified.\n";
        assert_eq!(
            parse_scanimage_devices(out),
            vec!["hpaio:/net/HP_LaserJet_M1536dnf_MFP?ip=192.168.1.20"]
        );
    }

    #[test]
    fn lpr_args_for_document() {
        let settings = PrintSettings {
            copies: 3,
            orientation: Orientation::Landscape,
            page_range: Some(PageRange::parse("2-4")),
            duplex: DuplexMode::LongEdge,
            paper_size: PaperSize::Letter,
            ..PrintSettings::default()
        };
        let args = lpr_args("HP", Path::new("/tmp/a.pdf"), DocumentKind::Document, &settings);
        assert_eq!(
            args,
            vec![
                "-P", "HP", "-#", "3", "-o", "landscape", "-o", "page-ranges=2-4", "-o",
                "sides=two-sided-long-edge", "-o", "media=Letter", "-o", "print-quality=4",
                "/tmp/a.pdf",
            ]
        );
    }

    #[test]
    fn single_copy_image_fits_page_and_skips_range() {
        let settings = PrintSettings {
            page_range: Some(PageRange::parse("2-4")),
            paper_source: PaperSource::ManualFeed,
            ..PrintSettings::default()
        };
        let args = lp_args("HP", Path::new("/tmp/a.png"), DocumentKind::Image, &settings);
        assert!(!args.contains(&"-n".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("page-ranges")));
        assert!(args.contains(&"InputSlot=ManualFeed".to_string()));
        assert!(args.contains(&"fit-to-page".to_string()));
        assert_eq!(args.first().map(String::as_str), Some("-d"));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/a.png"));
    }

    #[test]
    fn scanimage_args_for_feeder_in_gray() {
        let settings = ScanSettings {
            resolution: ScanResolution::Dpi600,
            source: ScanSource::Adf,
            color_mode: ScanColorMode::Gray,
            ..ScanSettings::default()
        };
        let args = scanimage_args(Some("hpaio:/net/x"), &settings, Path::new("/tmp/s/scan.png"));
        assert_eq!(
            args,
            vec![
                "-d", "hpaio:/net/x", "--resolution=600", "--mode=Gray", "--source=ADF",
                "--format=png", "-o", "/tmp/s/scan.png",
            ]
        );
    }
}
