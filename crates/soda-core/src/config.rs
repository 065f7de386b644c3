//! Dataset catalogue loaded from YAML.
//!
//! Each top-level key names a dataset and maps to its endpoint:
//!
//! ```yaml
//! accidentalidad_baq:
//!   api_url: https://www.datos.gov.co/resource/yb9r-2dsi.json
//!   description: Traffic accidents in Barranquilla
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::http_source::validate_endpoint;
use crate::SocrataSource;

/// Environment variable holding the catalogue path.
pub const CONFIG_ENV_VAR: &str = "SODA_CONFIG";

/// Path used when neither a flag nor [`CONFIG_ENV_VAR`] is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/api_sources.yml";

/// One configured dataset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetConfig {
    pub api_url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Dataset name to endpoint mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcesConfig {
    datasets: BTreeMap<String, DatasetConfig>,
}

impl SourcesConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parses the catalogue and checks every `api_url`.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let datasets: BTreeMap<String, DatasetConfig> = if contents.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_yaml::from_str(contents)?
        };

        for (name, dataset) in &datasets {
            validate_endpoint(&dataset.api_url).map_err(|reason| ConfigError::InvalidUrl {
                name: name.clone(),
                reason,
            })?;
        }

        Ok(Self { datasets })
    }

    /// Resolves the catalogue path: explicit value, then [`CONFIG_ENV_VAR`],
    /// then [`DEFAULT_CONFIG_PATH`].
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn dataset(&self, name: &str) -> Result<&DatasetConfig, ConfigError> {
        self.datasets
            .get(name)
            .ok_or_else(|| ConfigError::UnknownDataset {
                name: name.to_owned(),
            })
    }

    pub fn api_url(&self, name: &str) -> Result<&str, ConfigError> {
        self.dataset(name).map(|dataset| dataset.api_url.as_str())
    }

    /// Builds a [`SocrataSource`] for `name` on the default transport.
    pub fn socrata_source(&self, name: &str) -> Result<SocrataSource, ConfigError> {
        let api_url = self.api_url(name)?;
        SocrataSource::new(api_url).map_err(|reason| ConfigError::InvalidUrl {
            name: name.to_owned(),
            reason,
        })
    }

    /// Dataset names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DatasetConfig)> {
        self.datasets
            .iter()
            .map(|(name, dataset)| (name.as_str(), dataset))
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}
