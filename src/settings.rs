use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use crate::sensing::PresenceThresholds;

/// Per-session proctoring parameters. Fixed once a controller is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProctoringConfig {
    /// Violations that end the session.
    pub max_violations: u32,
    pub check_interval_ms: u64,
    pub target_width: u32,
    pub target_height: u32,
    /// Upper bound on one sample + classification pass.
    pub capture_timeout_ms: u64,
    pub jpeg_quality: u8,
    pub thresholds: PresenceThresholds,
}

impl Default for ProctoringConfig {
    fn default() -> Self {
        Self {
            max_violations: 5,
            check_interval_ms: 2000,
            target_width: 640,
            target_height: 480,
            capture_timeout_ms: 1500,
            jpeg_quality: 80,
            thresholds: PresenceThresholds::default(),
        }
    }
}

impl ProctoringConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_violations == 0 {
            bail!("max_violations must be greater than zero");
        }
        if self.check_interval_ms == 0 {
            bail!("check_interval_ms must be greater than zero");
        }
        if self.target_width == 0 || self.target_height == 0 {
            bail!(
                "target resolution must be non-zero, got {}x{}",
                self.target_width,
                self.target_height
            );
        }
        if self.capture_timeout_ms == 0 {
            bail!("capture_timeout_ms must be greater than zero");
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            bail!("jpeg_quality must be within 1..=100, got {}", self.jpeg_quality);
        }
        self.thresholds.validate()
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    proctoring: ProctoringConfig,
}

/// JSON-backed settings file. A missing or unreadable file falls back to
/// defaults rather than blocking the exam from starting.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Ignoring malformed settings at {}: {err}; using defaults",
                    path.display()
                );
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn proctoring(&self) -> ProctoringConfig {
        self.read().proctoring.clone()
    }

    pub fn update_proctoring(&self, config: ProctoringConfig) -> Result<()> {
        config.validate()?;
        let mut guard = self.write();
        guard.proctoring = config;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: UserSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Malformed settings in {}", self.path.display()))?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
