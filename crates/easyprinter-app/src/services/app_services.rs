// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application context: builds the backend once and owns the discovery,
// status monitor, and job runner for the life of the process. Front ends
// get everything they need from here.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use easyprinter_bridge::{PlatformBackend, platform_backend};
use easyprinter_core::config::DeviceConfig;
use easyprinter_core::error::Result;
use easyprinter_device::{DeviceDiscovery, JobDispatcher, StatusMonitor, WorkerRunner};
use tracing::{info, warn};

use super::data_dir;

/// Shared application services.
///
/// All fields are Arc-wrapped so the struct can be cloned into tasks.
#[derive(Clone)]
pub struct AppServices {
    backend: Arc<dyn PlatformBackend>,
    discovery: DeviceDiscovery,
    monitor: Arc<StatusMonitor>,
    workers: WorkerRunner,
    data_dir: PathBuf,
    config: Arc<Mutex<DeviceConfig>>,
}

impl AppServices {
    /// Initialise from the default data directory. Call once at startup.
    pub fn init() -> Self {
        Self::with_data_dir(data_dir::data_dir())
    }

    /// Initialise from `dir`, reading `config.json` there if it exists.
    pub fn with_data_dir(dir: PathBuf) -> Self {
        info!(path = %dir.display(), "initialising app services");
        let config = load_config(&dir).unwrap_or_default();
        let backend = platform_backend(&config);
        Self::assemble(backend, dir, config)
    }

    fn assemble(backend: Arc<dyn PlatformBackend>, dir: PathBuf, config: DeviceConfig) -> Self {
        let discovery = DeviceDiscovery::new(Arc::clone(&backend), &config);
        let monitor = StatusMonitor::new(
            Arc::clone(&backend),
            discovery.clone(),
            config.poll_interval(),
            config.command_timeout(),
        );
        let dispatcher = Arc::new(JobDispatcher::from_config(Arc::clone(&backend), &config));
        let workers = WorkerRunner::new(dispatcher);

        info!(platform = %backend.kind(), "app services initialised");

        Self {
            backend,
            discovery,
            monitor: Arc::new(monitor),
            workers,
            data_dir: dir,
            config: Arc::new(Mutex::new(config)),
        }
    }

    pub fn backend(&self) -> &Arc<dyn PlatformBackend> {
        &self.backend
    }

    pub fn discovery(&self) -> &DeviceDiscovery {
        &self.discovery
    }

    pub fn monitor(&self) -> &StatusMonitor {
        &self.monitor
    }

    pub fn workers(&self) -> &WorkerRunner {
        &self.workers
    }

    // -- Config Persistence --------------------------------------------------

    /// Get a clone of the current config.
    pub fn config(&self) -> DeviceConfig {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Update and persist the config. Running services keep the settings
    /// they were built with until the next start.
    pub fn save_config(&self, config: &DeviceConfig) -> Result<()> {
        *self.config.lock().unwrap_or_else(PoisonError::into_inner) = config.clone();
        persist_config(&self.data_dir, config)
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }
}

// -- Config file persistence -------------------------------------------------

const CONFIG_FILE: &str = "config.json";

fn load_config(data_dir: &Path) -> Option<DeviceConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &DeviceConfig) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(data_dir.join(CONFIG_FILE), json)?;
    Ok(())
}
