//! CLI configuration, loaded from a TOML file.
//!
//! Resolution order: an explicit `--config` path (or `METRICSPACE_CONFIG`),
//! then `<config dir>/metricspace/config.toml`. A missing file yields the
//! defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use metricspace_core::{BillingPeriodKind, EventSink};
use metricspace_storage::{MemoryBackend, PersistenceStore, RedbBackend};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Project name used for config and data directories.
pub const PROJECT_NAME: &str = "metricspace";

/// Which storage backend to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Durable single-file store.
    #[default]
    Redb,
    /// Lost when the process exits.
    Memory,
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend to open.
    pub backend: BackendKind,
    /// Database file for the redb backend; `~` is expanded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// `[billing]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Rollover policy for monthly usage.
    pub period: BillingPeriodKind,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricspaceConfig {
    /// Storage settings.
    pub storage: StorageConfig,
    /// Billing settings.
    pub billing: BillingConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl MetricspaceConfig {
    /// Default config file location for this platform.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(PROJECT_NAME).join("config.toml"))
    }

    /// The config file that [`load`](Self::load) would read.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        match explicit {
            Some(p) => Some(expand(p)),
            None => Self::default_config_path(),
        }
    }

    /// Loads the resolved config file, or defaults if it does not exist.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let Some(path) = Self::resolve_config_path(explicit) else {
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file; using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Database file for the redb backend.
    pub fn storage_path(&self) -> Option<PathBuf> {
        match &self.storage.path {
            Some(p) => Some(expand(p)),
            None => dirs::data_dir().map(|d| d.join(PROJECT_NAME).join("store.redb")),
        }
    }

    /// Opens the configured store, reporting writes to `events`.
    ///
    /// A redb file that cannot be opened (missing data directory, a
    /// directory at the path, a lock held by another process) is logged and
    /// replaced by an in-memory store for this run.
    pub fn open_store(&self, events: Arc<dyn EventSink>) -> PersistenceStore {
        match self.storage.backend {
            BackendKind::Memory => PersistenceStore::new(MemoryBackend::new(), events),
            BackendKind::Redb => {
                let Some(path) = self.storage_path() else {
                    tracing::warn!("Could not determine data directory; using in-memory storage");
                    return PersistenceStore::new(MemoryBackend::new(), events);
                };
                match RedbBackend::open(&path) {
                    Ok(backend) => PersistenceStore::new(backend, events),
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Could not open store; using in-memory storage"
                        );
                        PersistenceStore::new(MemoryBackend::new(), events)
                    }
                }
            }
        }
    }
}

fn expand(path: &str) -> PathBuf {
    Path::new(shellexpand::tilde(path).as_ref()).to_path_buf()
}
