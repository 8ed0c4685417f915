// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Periodic status polling of the target device.
//
// One tokio task runs the poll loop. Each tick finds the target, queries its
// queue depth, toner and raw status independently, classifies the text, and
// publishes a fresh `PrinterStatus` snapshot. Publishing replaces the
// value held by the watch channel, and then calls every subscriber in subscription order. A subscriber that panics is logged and
// skipped.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use easyprinter_bridge::PlatformBackend;
use easyprinter_core::config::DeviceConfig;
use easyprinter_core::types::{PrinterStatus, StatusFamily, TONER_UNKNOWN};

use crate::deadline::bounded;
use crate::discovery::DeviceDiscovery;
use crate::status::classify;

/// Handle returned by [`StatusMonitor::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&PrinterStatus) + Send + Sync>;

/// Owns the poll loop and the latest status snapshot.
///
/// Dropping the monitor stops the loop.
pub struct StatusMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    backend: Arc<dyn PlatformBackend>,
    discovery: DeviceDiscovery,
    family: StatusFamily,
    poll_interval: Duration,
    command_timeout: Duration,
    /// Holds the latest snapshot; receivers are handed out by `watch()`.
    current: watch::Sender<PrinterStatus>,
    subscribers: Mutex<Vec<(SubscriptionId, Callback)>>,
    next_id: AtomicU64,
    /// Serializes ticks so snapshots are published in poll order.
    tick: tokio::sync::Mutex<()>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StatusMonitor {
    pub fn new(
        backend: Arc<dyn PlatformBackend>,
        discovery: DeviceDiscovery,
        poll_interval: Duration,
        command_timeout: Duration,
    ) -> Self {
        let family = backend.kind().status_family();
        let (current, _) = watch::channel(PrinterStatus::default());
        Self {
            inner: Arc::new(MonitorInner {
                backend,
                discovery,
                family,
                poll_interval,
                command_timeout,
                current,
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                tick: tokio::sync::Mutex::new(()),
                task: Mutex::new(None),
            }),
        }
    }

    pub fn from_config(backend: Arc<dyn PlatformBackend>, config: &DeviceConfig) -> Self {
        let discovery = DeviceDiscovery::new(Arc::clone(&backend), config);
        Self::new(
            backend,
            discovery,
            config.poll_interval(),
            config.command_timeout(),
        )
    }

    /// Poll now, then every `poll_interval` until [`Self::stop`]. A second
    /// call while the loop is running does nothing. Must be called from
    /// within a tokio runtime.
    pub fn start(&self) {
        let mut task = self.inner.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("status monitor already running");
            return;
        }

        let inner = Arc::clone(&self.inner);
        info!(interval_secs = inner.poll_interval.as_secs_f32(), "starting status monitor");
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(inner.poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                inner.poll_once().await;
            }
        }));
    }

    /// Cancel the poll loop. Idempotent.
    pub fn stop(&self) {
        let handle = self
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            info!("status monitor stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Latest snapshot; `Unknown`/offline until the first poll completes.
    pub fn current(&self) -> PrinterStatus {
        self.inner.current.borrow().clone()
    }

    /// Channel that always holds the latest snapshot.
    pub fn watch(&self) -> watch::Receiver<PrinterStatus> {
        self.inner.current.subscribe()
    }

    /// Run one poll tick and return the published status.
    pub async fn poll_once(&self) -> PrinterStatus {
        self.inner.poll_once().await
    }

    /// Call `callback` with every status published from now on.
    pub fn subscribe(
        &self,
        callback: impl Fn(&PrinterStatus) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscriber. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(sub_id, _)| *sub_id != id);
    }
}

impl Drop for StatusMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

impl MonitorInner {
    async fn poll_once(self: &Arc<Self>) -> PrinterStatus {
        let _tick = self.tick.lock().await;

        // The probe runs on its own task so a panicking backend surfaces as
        // a JoinError instead of killing the loop.
        let inner = Arc::clone(self);
        let status = match tokio::spawn(async move { inner.probe().await }).await {
            Ok(status) => status,
            Err(join_err) => {
                let detail = panic_detail(join_err);
                error!(detail = %detail, "status poll failed");
                PrinterStatus::failed(detail)
            }
        }
        .normalized();

        self.publish(&status);
        status
    }

    async fn probe(&self) -> PrinterStatus {
        let Some(name) = self.discovery.find_target_device().await else {
            return PrinterStatus::not_found();
        };

        let backend = &self.backend;
        let limit = self.command_timeout;
        let (queue, toner, raw) = tokio::join!(
            bounded("queue depth", limit, backend.query_queue_depth(&name)),
            bounded("toner level", limit, backend.query_toner_level(&name)),
            bounded("printer status", limit, backend.query_raw_status(&name)),
        );

        let queue_depth = queue.unwrap_or_else(|e| {
            debug!(printer = %name, error = %e, "queue depth unavailable");
            0
        });
        let toner_percent = toner.unwrap_or_else(|e| {
            debug!(printer = %name, error = %e, "toner level unavailable");
            TONER_UNKNOWN
        });
        let raw = raw.unwrap_or_else(|e| {
            warn!(printer = %name, error = %e, "status query failed, assuming ready");
            "ready".to_string()
        });

        let classification = classify(&raw, self.family);
        if classification.defaulted {
            debug!(printer = %name, raw = %raw.trim(), "unrecognised status text");
        }

        PrinterStatus {
            name: Some(name),
            online: classification.online,
            state: classification.state,
            message: classification.message.to_string(),
            toner_percent,
            queue_depth,
            observed_at: Utc::now(),
        }
    }

    fn publish(&self, status: &PrinterStatus) {
        self.current.send_replace(status.clone());

        let subscribers: Vec<(SubscriptionId, Callback)> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for (id, callback) in subscribers {
            if catch_unwind(AssertUnwindSafe(|| callback(status))).is_err() {
                warn!(subscriber = id.0, "status subscriber panicked");
            }
        }
    }
}

fn panic_detail(err: tokio::task::JoinError) -> String {
    if err.is_cancelled() {
        return "status poll cancelled".to_string();
    }
    let payload = err.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "status poll panicked".to_string())
}
