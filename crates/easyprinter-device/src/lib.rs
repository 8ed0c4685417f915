// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// easyprinter-device: orchestration of the target printer/scanner.
//
// Status text classification, target discovery, the polling status monitor,
// and the print/scan/copy job pipelines. Everything here talks to the host
// through `easyprinter_bridge::PlatformBackend`.

mod deadline;
pub mod discovery;
pub mod dispatcher;
pub mod monitor;
pub mod status;
pub mod worker;

#[cfg(test)]
mod testing;

pub use discovery::{DeviceDiscovery, select_target};
pub use dispatcher::{JobDispatcher, NoProgress, ProgressReporter};
pub use monitor::{StatusMonitor, SubscriptionId};
pub use status::{Classification, classify};
pub use worker::{JobEvent, JobHandle, WorkerRunner};
