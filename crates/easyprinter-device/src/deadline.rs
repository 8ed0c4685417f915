// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hard deadline around a backend call.

use std::future::Future;
use std::time::Duration;

use easyprinter_core::error::{EasyPrinterError, Result};

/// Run `fut`, failing with [`EasyPrinterError::Timeout`] after `limit`.
pub(crate) async fn bounded<T>(
    operation: &str,
    limit: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| EasyPrinterError::Timeout {
            program: operation.to_string(),
            after: limit,
        })?
}
