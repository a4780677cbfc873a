//! Config - Grid Metadata Defaults
//!
//! Holds the values used to fill in metadata a caller did not supply and the
//! key suffixes used when a reduction demotes a removed axis into the
//! free-form metadata map. Configurations round-trip through TOML.
//!
//! ```toml
//! axis_unit = "um"
//! data_unit = "counts"
//! voxel_size = 0.5
//! ```
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

// =============================================================================
// Grid Configuration
// =============================================================================

/// Defaults applied when constructing grid arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Unit assigned to axes without an explicit unit.
    #[serde(default = "default_axis_unit")]
    pub axis_unit: String,

    /// Unit assigned to buffer values without an explicit unit.
    #[serde(default)]
    pub data_unit: String,

    /// Sample spacing assigned to axes without an explicit voxel size.
    #[serde(default = "default_voxel_size")]
    pub voxel_size: f64,

    /// Coordinate of index 0 for axes without an explicit offset.
    #[serde(default)]
    pub axis_offset: f64,

    /// Suffix of the metadata key holding a removed axis' centroid.
    #[serde(default = "default_avg_suffix")]
    pub avg_suffix: String,

    /// Suffix of the metadata key holding a removed axis' unit.
    #[serde(default = "default_unit_suffix")]
    pub unit_suffix: String,
}

fn default_axis_unit() -> String {
    "pix".to_string()
}

fn default_voxel_size() -> f64 {
    1.0
}

fn default_avg_suffix() -> String {
    "_avg".to_string()
}

fn default_unit_suffix() -> String {
    "_unit".to_string()
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            axis_unit: default_axis_unit(),
            data_unit: String::new(),
            voxel_size: default_voxel_size(),
            axis_offset: 0.0,
            avg_suffix: default_avg_suffix(),
            unit_suffix: default_unit_suffix(),
        }
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl GridConfig {
    /// Parse a configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Render the configuration as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| Error::config(format!("{}: {e}", path.display())))
    }

    /// Metadata key recording the centroid of a removed axis.
    #[must_use]
    pub fn avg_key(&self, label: &str) -> String {
        format!("{label}{}", self.avg_suffix)
    }

    /// Metadata key recording the unit of a removed axis.
    #[must_use]
    pub fn unit_key(&self, label: &str) -> String {
        format!("{label}{}", self.unit_suffix)
    }
}

// =============================================================================
// Tests
// =============================================================================
