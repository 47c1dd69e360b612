//! Data access layer configuration.
//!
//! Defines the YAML-serializable settings that bound preview sizes and
//! connection pragmas. Every field has a default, so a partial (or empty)
//! file is valid.
//!
//! # Example YAML
//!
//! ```yaml
//! delete_preview_limit: 10
//! drop_sample_limit: 5
//! bulk_preview_limit: 3
//! foreign_keys: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings applied to every [`Database`](crate::Database) handle.
///
/// # Examples
///
/// ```
/// use docstore_sqlite::DalConfig;
///
/// let config: DalConfig = serde_yaml::from_str("drop_sample_limit: 2").unwrap();
/// assert_eq!(config.drop_sample_limit, 2);
/// assert_eq!(config.delete_preview_limit, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DalConfig {
    /// Rows shown in the warning before a delete.
    pub delete_preview_limit: usize,
    /// Rows sampled in the warning before a table drop.
    pub drop_sample_limit: usize,
    /// Rows rendered by a bulk insert dry run.
    pub bulk_preview_limit: usize,
    /// Enable foreign key enforcement on open.
    pub foreign_keys: bool,
}

impl Default for DalConfig {
    fn default() -> Self {
        Self {
            delete_preview_limit: 10,
            drop_sample_limit: 5,
            bulk_preview_limit: 3,
            foreign_keys: false,
        }
    }
}

impl DalConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::DalError::Io) if the file cannot be read, or
    /// [`Config`](crate::DalError::Config) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
