// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Child-process runner shared by every backend.
//
// Each call captures stdout/stderr, hides the console window on Windows, and
// runs under a hard timeout. The child is spawned with `kill_on_drop`, so a
// timed-out future takes the process down with it.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use easyprinter_core::config::DeviceConfig;
use easyprinter_core::error::{EasyPrinterError, Result};

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Per-category limits for backend commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Listing and status queries.
    pub command: Duration,
    /// One print invocation.
    pub print: Duration,
    /// One scan invocation.
    pub scan: Duration,
}

impl Timeouts {
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            command: config.command_timeout(),
            print: config.print_timeout(),
            scan: config.scan_timeout(),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::from_config(&DeviceConfig::default())
    }
}

/// Captured result of a finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Non-empty, trimmed stdout lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines().map(str::trim).filter(|line| !line.is_empty())
    }
}

/// Create a Command that hides the console window on Windows.
pub fn hidden_command(program: &str) -> Command {
    let mut cmd = Command::new(program);
    #[cfg(target_os = "windows")]
    cmd.creation_flags(CREATE_NO_WINDOW);
    cmd
}

/// Run `program` to completion, capturing its output. A non-zero exit is
/// still `Ok`; see [`run_checked`].
pub async fn run<I, S>(program: &str, args: I, limit: Duration) -> Result<CommandOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = hidden_command(program);
    // Status parsing matches the untranslated lpstat and scanimage wording.
    cmd.args(args)
        .env("LC_ALL", "C")
        .stdin(Stdio::null())
        .kill_on_drop(true);

    debug!(program, timeout_secs = limit.as_secs(), "running backend command");

    let output = tokio::time::timeout(limit, cmd.output())
        .await
        .map_err(|_| {
            warn!(program, timeout_secs = limit.as_secs(), "backend command timed out, killed");
            EasyPrinterError::Timeout {
                program: program.to_string(),
                after: limit,
            }
        })?
        .map_err(|e| spawn_error(program, e))?;

    Ok(CommandOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// Like [`run`], but a non-zero exit becomes [`EasyPrinterError::CommandFailed`].
pub async fn run_checked<I, S>(program: &str, args: I, limit: Duration) -> Result<CommandOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = run(program, args, limit).await?;
    if output.success() {
        Ok(output)
    } else {
        Err(EasyPrinterError::CommandFailed {
            program: program.to_string(),
            code: output.code,
            stderr: output.stderr,
        })
    }
}

/// Start a GUI program and return without waiting for it.
pub fn launch_detached<I, S>(program: &str, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    hidden_command(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|e| spawn_error(program, e))
}

fn spawn_error(program: &str, err: std::io::Error) -> EasyPrinterError {
    if err.kind() == ErrorKind::NotFound {
        EasyPrinterError::BackendUnavailable(format!("`{program}` is not installed"))
    } else {
        EasyPrinterError::TransientIo(err)
    }
}
