//! Persisted state of tracked resources
//!
//! The state file is a JSON document owned by the host. Adapters never see
//! it; they get one record at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Current state file format version.
pub const STATE_VERSION: u32 = 1;

/// Address of a resource block: type name plus local label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub label: String,
}

impl Address {
    pub fn new(resource_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            label: label.into(),
        }
    }

    /// Parse `type.label`.
    pub fn parse(s: &str) -> Option<Self> {
        let (resource_type, label) = s.split_once('.')?;
        if resource_type.is_empty() || label.is_empty() {
            return None;
        }
        Some(Self::new(resource_type, label))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.label)
    }
}

/// One tracked resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedResource {
    #[serde(flatten)]
    pub address: Address,
    /// Remote identifier.
    pub id: String,
    /// Last known record.
    pub attributes: Value,
}

/// The whole state document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    pub version: u32,
    /// Bumped on every save.
    pub serial: u64,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub resources: Vec<TrackedResource>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            serial: 0,
            last_updated: Utc::now(),
            resources: Vec::new(),
        }
    }
}

/// Errors reading or writing the state file.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to access state file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("state file {path} is not valid: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("state file {path} has version {found}, expected {}", STATE_VERSION)]
    Version { path: String, found: u32 },
}

impl StateFile {
    /// Load state from disk, or return an empty state if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let display = path.display().to_string();
        if !path.exists() {
            log::debug!("State file {display} does not exist, starting empty");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| StateError::Io {
            path: display.clone(),
            source,
        })?;
        let state: Self = serde_json::from_str(&content).map_err(|source| StateError::Parse {
            path: display.clone(),
            source,
        })?;
        if state.version != STATE_VERSION {
            return Err(StateError::Version {
                path: display,
                found: state.version,
            });
        }

        log::debug!(
            "Loaded {} tracked resources from {display}",
            state.resources.len()
        );
        Ok(state)
    }

    /// Save state to disk, bumping the serial.
    ///
    /// Writes a sibling temporary file first and renames it over the target.
    pub fn save(&mut self, path: &Path) -> Result<(), StateError> {
        let display = path.display().to_string();
        self.serial += 1;
        self.last_updated = Utc::now();

        let content = serde_json::to_string_pretty(self).map_err(|source| StateError::Parse {
            path: display.clone(),
            source,
        })?;
        let io_err = |source: io::Error| StateError::Io {
            path: display.clone(),
            source,
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, content).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;

        log::debug!("Saved state serial {} to {display}", self.serial);
        Ok(())
    }

    /// Find a tracked resource by address.
    pub fn get(&self, address: &Address) -> Option<&TrackedResource> {
        self.resources.iter().find(|r| &r.address == address)
    }

    /// Insert or replace a tracked resource, keeping addresses sorted.
    pub fn upsert(&mut self, resource: TrackedResource) {
        match self
            .resources
            .binary_search_by(|r| r.address.cmp(&resource.address))
        {
            Ok(i) => self.resources[i] = resource,
            Err(i) => self.resources.insert(i, resource),
        }
    }

    /// Stop tracking a resource. Returns whether it was tracked.
    pub fn remove(&mut self, address: &Address) -> bool {
        let before = self.resources.len();
        self.resources.retain(|r| &r.address != address);
        self.resources.len() < before
    }
}
