// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Windows backend: print spooler via PowerShell, scanning via WIA automation.
//
// Every call runs `powershell` with a hidden window. The shell print verbs
// have no copies flag, so printing runs one invocation per copy.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use easyprinter_core::error::{EasyPrinterError, Result};
use easyprinter_core::settings::{PrintSettings, ScanSettings, ScanSource};
use easyprinter_core::types::{DocumentKind, PlatformKind};

use crate::command::{self, CommandOutput, Timeouts};
use crate::cups::SCAN_FILE_NAME;
use crate::traits::PlatformBackend;

/// WIA `wiaFormatPNG`.
const WIA_FORMAT_PNG: &str = "{B96B3CAF-0728-11D3-9D7B-0000F81EF32E}";

pub struct WindowsBackend {
    timeouts: Timeouts,
    temp_dir: PathBuf,
}

impl WindowsBackend {
    pub fn new(timeouts: Timeouts, temp_dir: PathBuf) -> Self {
        Self { timeouts, temp_dir }
    }

    async fn powershell(&self, script: &str, limit: std::time::Duration) -> Result<CommandOutput> {
        command::run_checked(
            "powershell",
            [
                "-NoProfile",
                "-NonInteractive",
                "-WindowStyle",
                "Hidden",
                "-Command",
                script,
            ],
            limit,
        )
        .await
    }

    /// One copy: primary verb, then the generic `Print` verb.
    async fn print_once(&self, printer: &str, path: &Path, kind: DocumentKind) -> Result<()> {
        let primary = match kind {
            DocumentKind::Document => {
                self.powershell(&print_to_script(path, printer), self.timeouts.print)
                    .await
            }
            DocumentKind::Image => {
                let file = path.display().to_string();
                command::run_checked(
                    "rundll32",
                    ["shimgvw.dll,ImageView_PrintTo", "/pt", file.as_str(), printer],
                    self.timeouts.print,
                )
                .await
            }
        };

        match primary {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, "primary print verb failed, falling back to Print");
                self.powershell(&print_verb_script(path), self.timeouts.print)
                    .await
                    .map(|_| ())
            }
        }
    }
}

#[async_trait]
impl PlatformBackend for WindowsBackend {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Windows
    }

    async fn list_printers(&self) -> Result<Vec<String>> {
        let out = self
            .powershell(
                "Get-Printer | Select-Object -ExpandProperty Name",
                self.timeouts.command,
            )
            .await?;
        Ok(out.lines().map(str::to_string).collect())
    }

    async fn query_raw_status(&self, printer: &str) -> Result<String> {
        let script = format!(
            "Get-Printer -Name {} | Select-Object -ExpandProperty PrinterStatus",
            ps_quote(printer)
        );
        let out = self.powershell(&script, self.timeouts.command).await?;
        Ok(out.stdout)
    }

    async fn query_queue_depth(&self, printer: &str) -> Result<u32> {
        let script = format!(
            "(Get-PrintJob -PrinterName {} -ErrorAction SilentlyContinue | Measure-Object).Count",
            ps_quote(printer)
        );
        let out = self.powershell(&script, self.timeouts.command).await?;
        out.stdout
            .trim()
            .parse()
            .map_err(|_| EasyPrinterError::CommandFailed {
                program: "powershell".into(),
                code: out.code,
                stderr: format!("unexpected job count output: {:?}", out.stdout.trim()),
            })
    }

    async fn list_scanners(&self) -> Result<Vec<String>> {
        let out = self
            .powershell(WIA_LIST_SCRIPT, self.timeouts.command)
            .await?;
        Ok(out.lines().map(str::to_string).collect())
    }

    #[instrument(skip_all, fields(printer = %printer, path = %path.display(), copies = settings.copies))]
    async fn print_document(
        &self,
        printer: &str,
        path: &Path,
        kind: DocumentKind,
        settings: &PrintSettings,
    ) -> Result<()> {
        for copy in 1..=settings.copies.max(1) {
            self.print_once(printer, path, kind).await?;
            info!(copy, "copy submitted to spooler");
        }
        Ok(())
    }

    #[instrument(skip_all, fields(device = device.unwrap_or("default")))]
    async fn scan_document(&self, device: Option<&str>, settings: &ScanSettings) -> Result<Vec<u8>> {
        let scratch = tempfile::Builder::new()
            .prefix("easyprinter-scan-")
            .tempdir_in(&self.temp_dir)?;
        // WIA refuses to overwrite, so the file must not exist yet.
        let out_path = scratch.path().join(SCAN_FILE_NAME);

        let script = wia_scan_script(device, settings, &out_path);
        let scanned = match self.powershell(&script, self.timeouts.scan).await {
            Ok(_) => tokio::fs::read(&out_path).await.map_err(EasyPrinterError::from),
            Err(e) => Err(e),
        };

        match scanned {
            Ok(bytes) if !bytes.is_empty() => Ok(bytes),
            Ok(_) => Err(open_fax_and_scan("WIA produced an empty file".into())),
            Err(e) => Err(open_fax_and_scan(e.to_string())),
        }
    }
}

/// Open Windows Fax and Scan for manual scanning, best effort.
fn open_fax_and_scan(reason: String) -> EasyPrinterError {
    warn!(reason = %reason, "WIA scan failed, opening Windows Fax and Scan");
    if let Err(e) = command::launch_detached("wfs.exe", std::iter::empty::<&str>()) {
        warn!(error = %e, "could not open Windows Fax and Scan");
    }
    EasyPrinterError::ManualScanRequired(format!(
        "use Windows Fax and Scan to scan ({reason})"
    ))
}

/// Single-quoted PowerShell literal.
pub fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn print_to_script(path: &Path, printer: &str) -> String {
    format!(
        "Start-Process -FilePath {} -Verb PrintTo -ArgumentList {} -WindowStyle Hidden",
        ps_quote(&path.display().to_string()),
        ps_quote(&format!("\"{printer}\""))
    )
}

fn print_verb_script(path: &Path) -> String {
    format!(
        "Start-Process -FilePath {} -Verb Print -WindowStyle Hidden",
        ps_quote(&path.display().to_string())
    )
}

const WIA_LIST_SCRIPT: &str = r#"$manager = New-Object -ComObject WIA.DeviceManager
foreach ($info in $manager.DeviceInfos) {
    if ($info.Type -eq 1) { Write-Output $info.Properties["Name"].Value }
}"#;

/// WIA automation script that scans one page to `out` as PNG.
///
/// Item properties: 6146 current intent, 6147/6148 horizontal/vertical DPI.
/// Device property 3088 selects the feeder (1) or flatbed (2).
pub fn wia_scan_script(device: Option<&str>, settings: &ScanSettings, out: &Path) -> String {
    let select = match device {
        Some(name) => format!(
            "if ($info.Type -eq 1 -and $info.Properties[\"Name\"].Value -eq {}) {{ $device = $info.Connect(); break }}",
            ps_quote(name)
        ),
        None => "if ($info.Type -eq 1) { $device = $info.Connect(); break }".to_string(),
    };
    let handling = match settings.source {
        ScanSource::Adf => 1,
        ScanSource::Flatbed => 2,
    };
    let dpi = settings.resolution.dpi();

    format!(
        r#"$ErrorActionPreference = "Stop"
$manager = New-Object -ComObject WIA.DeviceManager
$device = $null
foreach ($info in $manager.DeviceInfos) {{
    {select}
}}
if ($device -eq $null) {{ Write-Error "scanner not found"; exit 1 }}
try {{ $device.Properties["3088"].Value = {handling} }} catch {{ }}
$item = $device.Items[1]
$item.Properties["6146"].Value = {intent}
$item.Properties["6147"].Value = {dpi}
$item.Properties["6148"].Value = {dpi}
$image = $item.Transfer("{format}")
$image.SaveFile({out})"#,
        intent = settings.color_mode.wia_intent(),
        format = WIA_FORMAT_PNG,
        out = ps_quote(&out.display().to_string()),
    )
}
