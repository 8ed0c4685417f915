// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for EasyPrinter.

use std::time::Duration;

use thiserror::Error;

/// Top-level error type for all EasyPrinter operations.
#[derive(Debug, Error)]
pub enum EasyPrinterError {
    // -- Device --
    #[error("target device not found")]
    DeviceNotFound,

    // -- Backend --
    #[error("backend tool unavailable: {0}")]
    BackendUnavailable(String),

    #[error("`{program}` timed out after {}s", .after.as_secs())]
    Timeout { program: String, after: Duration },

    #[error("`{program}` exited with {}: {stderr}", .code.map_or_else(|| "signal".to_string(), |c| format!("code {c}")))]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("automatic scanning unavailable: {0}")]
    ManualScanRequired(String),

    // -- Documents --
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Storage --
    #[error("file I/O error: {0}")]
    TransientIo(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EasyPrinterError {
    /// Whether the failure came from the host tool chain (missing tool,
    /// hung tool, non-zero exit) rather than from the request itself.
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Self::BackendUnavailable(_) | Self::Timeout { .. } | Self::CommandFailed { .. }
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EasyPrinterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_program_and_seconds() {
        let err = EasyPrinterError::Timeout {
            program: "lpstat".into(),
            after: Duration::from_secs(10),
        };
        assert_eq!(err.to_string(), "`lpstat` timed out after 10s");
    }

    #[test]
    fn command_failed_without_code_reports_signal() {
        let err = EasyPrinterError::CommandFailed {
            program: "lpr".into(),
            code: None,
            stderr: "killed".into(),
        };
        assert!(err.to_string().contains("signal"));
        assert!(err.is_backend_failure());
    }

    #[test]
    fn io_error_converts_into_transient_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: EasyPrinterError = io.into();
        assert!(matches!(err, EasyPrinterError::TransientIo(_)));
        assert!(!err.is_backend_failure());
    }
}
