// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: device status snapshots, platform identity, and job
// results.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Toner level reported when no sensor reading is available.
pub const TONER_UNKNOWN: i32 = -1;

/// Unique identifier for a print, scan, or copy job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host platform family. Selects the backend once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// Windows print spooler + WIA.
    Windows,
    /// macOS CUPS + SANE, Image Capture as manual fallback.
    MacOs,
    /// Linux CUPS + SANE.
    Linux,
}

impl PlatformKind {
    /// Platform the binary was compiled for. Anything that is neither
    /// Windows nor macOS is treated as a CUPS/SANE host.
    pub fn detect() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    /// Which status vocabulary the platform's tools speak.
    pub fn status_family(&self) -> StatusFamily {
        match self {
            Self::Windows => StatusFamily::Spooler,
            Self::MacOs | Self::Linux => StatusFamily::Cups,
        }
    }
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Linux => "linux",
        };
        f.write_str(name)
    }
}

/// Status text vocabulary. The same condition is worded differently by the
/// Windows spooler ("offline", "busy") and by CUPS ("disabled", "printing").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusFamily {
    Spooler,
    Cups,
}

/// Normalized device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrinterState {
    #[default]
    Unknown,
    Ready,
    Printing,
    Scanning,
    Copying,
    Warming,
    PaperJam,
    PaperOut,
    TonerLow,
    Error,
    Offline,
}

impl PrinterState {
    /// Default user-facing message for this state.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unknown => "Статус неизвестен",
            Self::Ready => "Готов к работе",
            Self::Printing => "Идёт печать...",
            Self::Scanning => "Сканирование...",
            Self::Copying => "Копирование...",
            Self::Warming => "Прогрев...",
            Self::PaperJam => "Замятие бумаги",
            Self::PaperOut => "Нет бумаги",
            Self::TonerLow => "Мало тонера",
            Self::Error => "Ошибка принтера",
            Self::Offline => "Принтер не в сети",
        }
    }

    /// Whether a device in this state is reachable at all.
    pub fn is_online(&self) -> bool {
        !matches!(self, Self::Offline | Self::Unknown)
    }
}

/// Message published when no device could be selected.
pub const DEVICE_NOT_FOUND_MESSAGE: &str = "Принтер не найден";

/// Immutable snapshot of the target device, replaced wholesale on every poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterStatus {
    pub name: Option<String>,
    pub online: bool,
    pub state: PrinterState,
    pub message: String,
    /// 0–100, or [`TONER_UNKNOWN`].
    pub toner_percent: i32,
    pub queue_depth: u32,
    pub observed_at: DateTime<Utc>,
}

impl Default for PrinterStatus {
    fn default() -> Self {
        Self {
            name: None,
            online: false,
            state: PrinterState::Unknown,
            message: PrinterState::Unknown.message().to_string(),
            toner_percent: TONER_UNKNOWN,
            queue_depth: 0,
            observed_at: Utc::now(),
        }
    }
}

impl PrinterStatus {
    /// Status published when discovery found nothing.
    pub fn not_found() -> Self {
        Self {
            state: PrinterState::Offline,
            message: DEVICE_NOT_FOUND_MESSAGE.to_string(),
            ..Self::default()
        }
    }

    /// Status published when a poll tick failed unexpectedly.
    pub fn failed(detail: impl std::fmt::Display) -> Self {
        Self {
            state: PrinterState::Error,
            message: format!("Ошибка: {detail}"),
            ..Self::default()
        }
    }

    /// Enforce the snapshot invariants: toner in `{-1} ∪ [0,100]` and
    /// `Offline ⇒ !online`.
    pub fn normalized(mut self) -> Self {
        self.toner_percent = normalize_toner(self.toner_percent);
        if self.state == PrinterState::Offline {
            self.online = false;
        }
        self
    }
}

/// Clamp a raw toner reading. Negative values mean "no reading"; values above
/// 100 are sensor noise and are capped.
pub fn normalize_toner(raw: i32) -> i32 {
    if raw < 0 { TONER_UNKNOWN } else { raw.min(100) }
}

/// How a file is routed through the print pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Handed to the spooler as-is (PDF).
    Document,
    /// Decoded, adjusted, and re-encoded before printing.
    Image,
}

impl DocumentKind {
    /// Infer the kind from a file extension (case-insensitive, no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Document),
            "jpg" | "jpeg" | "png" | "bmp" | "tiff" | "tif" | "gif" => Some(Self::Image),
            _ => None,
        }
    }

    /// Infer the kind from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Outcome of one job, handed to the caller exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: JobId,
    pub success: bool,
    /// Produced file (scan output), if any.
    pub artifact_path: Option<PathBuf>,
    pub error_message: Option<String>,
}

impl JobResult {
    pub fn succeeded(job_id: JobId, artifact_path: Option<PathBuf>) -> Self {
        Self {
            job_id,
            success: true,
            artifact_path,
            error_message: None,
        }
    }

    pub fn failed(job_id: JobId, error_message: impl Into<String>) -> Self {
        Self {
            job_id,
            success: false,
            artifact_path: None,
            error_message: Some(error_message.into()),
        }
    }
}
