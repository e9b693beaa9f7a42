//! Store and validator configuration, loaded from TOML.
//!
//! Every key is optional; a missing file or key means the default.

use owsmodel_types::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Behaviour of a [`crate::RecordStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Publish an event when `set` leaves the value unchanged.
    pub notify_touch: bool,
    pub validation: ValidationConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            notify_touch: true,
            validation: ValidationConfig::default(),
        }
    }
}

/// Which checks the [`crate::Validator`] runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Required features must hold a value.
    pub check_required: bool,
    /// Scalar values must satisfy their datatype facets.
    pub check_facets: bool,
    /// Descend into contained records.
    pub recursive: bool,
    /// Report non-containment references to destroyed records.
    pub report_dangling: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_required: true,
            check_facets: true,
            recursive: true,
            report_dangling: true,
        }
    }
}

impl StoreConfig {
    pub fn from_toml_str(content: &str) -> ModelResult<Self> {
        toml::from_str(content).map_err(|e| ModelError::Config(e.to_string()))
    }

    /// Loads from a TOML file. Unlike [`Self::load_from`], an unreadable or
    /// malformed file is an error.
    pub fn try_load_from(path: &Path) -> ModelResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Loads from a TOML file, falling back to defaults if the file is
    /// missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!(path = %path.display(), "No store config found, using defaults");
            return Self::default();
        }
        match Self::try_load_from(path) {
            Ok(config) => {
                info!(path = %path.display(), notify_touch = config.notify_touch, "Loaded store config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load store config, using defaults");
                Self::default()
            }
        }
    }
}
