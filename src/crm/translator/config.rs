use std::collections::BTreeMap;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crm::translator::dispatch::{ATTRIBUTE_BATCH_SIZE, ENTITY_BATCH_SIZE};
use crate::crm::translator::error::{Result, TranslatorError};

/// A named metadata store connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Catalog snapshot backing the connection. Relative paths resolve
    /// against the configuration file's directory.
    pub catalog: PathBuf,
}

/// Contents of the JSON configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default)]
    pub default_connection: Option<String>,
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionConfig>,
    #[serde(default = "default_entity_batch_size")]
    pub entity_batch_size: NonZeroUsize,
    #[serde(default = "default_attribute_batch_size")]
    pub attribute_batch_size: NonZeroUsize,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            default_connection: None,
            connections: BTreeMap::new(),
            entity_batch_size: ENTITY_BATCH_SIZE,
            attribute_batch_size: ATTRIBUTE_BATCH_SIZE,
        }
    }
}

impl TranslatorConfig {
    /// Loads the configuration and resolves relative catalog paths.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TranslatorError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        let mut config: TranslatorConfig = serde_json::from_str(&source)?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for connection in config.connections.values_mut() {
            if connection.catalog.is_relative() {
                connection.catalog = base.join(&connection.catalog);
            }
        }
        Ok(config)
    }

    /// Picks the connection named `name`, or the default one.
    ///
    /// Without a name and without a default, a configuration holding exactly
    /// one connection uses it.
    pub fn connection(&self, name: Option<&str>) -> Result<(&str, &ConnectionConfig)> {
        let name = match name.or(self.default_connection.as_deref()) {
            Some(name) => name,
            None if self.connections.len() == 1 => {
                return self
                    .connections
                    .iter()
                    .next()
                    .map(|(name, connection)| (name.as_str(), connection))
                    .ok_or_else(|| TranslatorError::Config("no connections".into()));
            }
            None => {
                return Err(TranslatorError::Config(
                    "no connection named and no default_connection set".into(),
                ));
            }
        };

        self.connections
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(name, connection)| (name.as_str(), connection))
            .ok_or_else(|| TranslatorError::UnknownConnection(name.to_string()))
    }
}

fn default_entity_batch_size() -> NonZeroUsize {
    ENTITY_BATCH_SIZE
}

fn default_attribute_batch_size() -> NonZeroUsize {
    ATTRIBUTE_BATCH_SIZE
}
