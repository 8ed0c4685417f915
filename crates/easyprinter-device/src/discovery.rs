// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Target device discovery.
//
// Lists the host's print queues (and scanners) through the platform backend
// and picks the configured target by name. Never fails: backend errors are
// logged and look like an empty list.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use easyprinter_bridge::PlatformBackend;
use easyprinter_core::config::DeviceConfig;

use crate::deadline::bounded;

/// Finds the one device this application drives.
#[derive(Clone)]
pub struct DeviceDiscovery {
    backend: Arc<dyn PlatformBackend>,
    config: DeviceConfig,
    timeout: Duration,
}

impl DeviceDiscovery {
    pub fn new(backend: Arc<dyn PlatformBackend>, config: &DeviceConfig) -> Self {
        Self {
            backend,
            config: config.clone(),
            timeout: config.command_timeout(),
        }
    }

    /// Override the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Every print queue the host knows about; empty on any failure.
    pub async fn list_devices(&self) -> Vec<String> {
        match bounded("list printers", self.timeout, self.backend.list_printers()).await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "printer listing failed");
                Vec::new()
            }
        }
    }

    /// The configured target, else the first listed device, else `None`.
    pub async fn find_target_device(&self) -> Option<String> {
        let devices = self.list_devices().await;
        let target = select_target(&devices, &self.config);
        debug!(found = ?target, listed = devices.len(), "target printer lookup");
        target
    }

    /// Every scanner the host's scan stack sees; empty on any failure.
    pub async fn list_scanners(&self) -> Vec<String> {
        match bounded("list scanners", self.timeout, self.backend.list_scanners()).await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "scanner listing failed");
                Vec::new()
            }
        }
    }

    /// Same selection rule as [`Self::find_target_device`], over scanners.
    pub async fn find_target_scanner(&self) -> Option<String> {
        let scanners = self.list_scanners().await;
        let target = select_target(&scanners, &self.config);
        debug!(found = ?target, listed = scanners.len(), "target scanner lookup");
        target
    }
}

/// First name matching the configured target, else the first name.
pub fn select_target(names: &[String], config: &DeviceConfig) -> Option<String> {
    names
        .iter()
        .find(|name| config.matches_target(name))
        .or_else(|| names.first())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn prefers_matching_device() {
        let config = DeviceConfig::default();
        let listed = names(&["Canon X", "HP LaserJet M1536dnf"]);
        assert_eq!(
            select_target(&listed, &config).as_deref(),
            Some("HP LaserJet M1536dnf")
        );
    }

    #[test]
    fn falls_back_to_first_device() {
        let config = DeviceConfig::default();
        assert_eq!(
            select_target(&names(&["Canon X"]), &config).as_deref(),
            Some("Canon X")
        );
    }

    #[test]
    fn empty_list_has_no_target() {
        assert_eq!(select_target(&[], &DeviceConfig::default()), None);
    }

    #[tokio::test]
    async fn target_follows_installed_printers() {
        let backend = Arc::new(FakeBackend::with_printer("Canon X", "idle"));
        let discovery = DeviceDiscovery::new(backend.clone(), &DeviceConfig::default());
        assert_eq!(discovery.find_target_device().await.as_deref(), Some("Canon X"));

        backend.set_printers(&["Canon X", "HP LaserJet M1536dnf"]);
        assert_eq!(
            discovery.find_target_device().await.as_deref(),
            Some("HP LaserJet M1536dnf")
        );

        backend.set_printers(&[]);
        assert_eq!(discovery.find_target_device().await, None);
    }

    #[tokio::test]
    async fn backend_failure_collapses_to_empty() {
        let backend = Arc::new(FakeBackend {
            listing_fails: true,
            ..FakeBackend::default()
        });
        let discovery = DeviceDiscovery::new(backend, &DeviceConfig::default());
        assert!(discovery.list_devices().await.is_empty());
        assert!(discovery.find_target_device().await.is_none());
    }

    #[tokio::test]
    async fn finds_target_scanner() {
        let backend = Arc::new(FakeBackend {
            scanners: names(&["epson2:libusb:001:004", "hpaio:/net/HP_LaserJet_M1536dnf_MFP"]),
            ..FakeBackend::default()
        });
        let discovery = DeviceDiscovery::new(backend, &DeviceConfig::default());
        assert_eq!(
            discovery.find_target_scanner().await.as_deref(),
            Some("hpaio:/net/HP_LaserJet_M1536dnf_MFP")
        );
    }
}
