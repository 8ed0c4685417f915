// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Device configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::PlatformKind;

/// Persistent device settings. Every field has a default so a partial
/// `config.json` is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Vendor substring the target device name must contain.
    pub target_vendor: String,
    /// Model substrings; at least one must match when non-empty.
    pub target_model_hints: Vec<String>,
    /// Seconds between status polls.
    pub poll_interval_secs: u64,
    /// Hard limit for listing and status commands.
    pub command_timeout_secs: u64,
    /// Hard limit for one print invocation.
    pub print_timeout_secs: u64,
    /// Hard limit for one scan invocation.
    pub scan_timeout_secs: u64,
    /// Force a backend instead of the compile-target one.
    pub platform_override: Option<PlatformKind>,
    /// Where job temp files go; `None` uses the system temp dir.
    pub temp_dir: Option<PathBuf>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            target_vendor: "HP".into(),
            target_model_hints: vec!["1536".into(), "LaserJet".into()],
            poll_interval_secs: 5,
            command_timeout_secs: 10,
            print_timeout_secs: 60,
            scan_timeout_secs: 120,
            platform_override: None,
            temp_dir: None,
        }
    }
}

impl DeviceConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }

    pub fn print_timeout(&self) -> Duration {
        Duration::from_secs(self.print_timeout_secs.max(1))
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs.max(1))
    }

    /// Platform to run on: the override if set, else the compile target.
    pub fn platform(&self) -> PlatformKind {
        self.platform_override.unwrap_or_else(PlatformKind::detect)
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Case-insensitive target match: the vendor substring, plus one of the
    /// model hints when any are configured.
    pub fn matches_target(&self, device_name: &str) -> bool {
        let name = device_name.to_lowercase();
        if !name.contains(&self.target_vendor.to_lowercase()) {
            return false;
        }
        self.target_model_hints.is_empty()
            || self
                .target_model_hints
                .iter()
                .any(|hint| name.contains(&hint.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_laserjet() {
        let config = DeviceConfig::default();
        assert!(config.matches_target("HP LaserJet Pro MFP M1536dnf"));
        assert!(config.matches_target("hp_1536_network"));
        assert!(!config.matches_target("Canon LBP"));
        assert!(!config.matches_target("HP DeskJet 2130"));
    }

    #[test]
    fn empty_hints_match_vendor_only() {
        let config = DeviceConfig {
            target_model_hints: Vec::new(),
            ..DeviceConfig::default()
        };
        assert!(config.matches_target("HP DeskJet 2130"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: DeviceConfig =
            serde_json::from_str(r#"{"poll_interval_secs": 2, "platform_override": "linux"}"#)
                .expect("parse config");
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.platform(), PlatformKind::Linux);
        assert_eq!(config.command_timeout(), Duration::from_secs(10));
        assert_eq!(config.target_vendor, "HP");
    }

    #[test]
    fn zero_intervals_are_floored() {
        let config = DeviceConfig {
            poll_interval_secs: 0,
            ..DeviceConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }
}
