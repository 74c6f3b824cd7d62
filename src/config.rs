use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{GenQuakemlError, Result};
use crate::pipeline::output::OutputFormat;

pub const DEFAULT_CONFIG_FILE: &str = "genquakeml.toml";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub provenance: ProvenanceConfig,
    pub identifiers: IdentifierConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
    pub eatws: EatwsConfig,
}

/// Defaults for creation info when the input names no author or agency
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProvenanceConfig {
    pub author: Option<String>,
    pub agency_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentifierConfig {
    /// Authority component of every `smi:` resource id
    pub authority: String,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            authority: "ga.gov.au".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub extension: String,
    pub indent: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::QuakeMl,
            extension: "xml".to_string(),
            indent: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for JSON log files; console only when unset
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EatwsConfig {
    pub base_url: String,
    pub cdn_url: String,
    pub timeout_seconds: u64,
}

impl Default for EatwsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://earthquakes.ga.gov.au/geoserver/earthquakes/wfs".to_string(),
            cdn_url: "https://cdn.eatws.net/skip/events".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from `genquakeml.toml` in the
    /// working directory when it exists. An explicitly named file that cannot
    /// be read is an error; a missing default file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            GenQuakemlError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&config_content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(author) = std::env::var("GENQUAKEML_AUTHOR") {
            self.provenance.author = Some(author);
        }
        if let Ok(agency_id) = std::env::var("GENQUAKEML_AGENCY_ID") {
            self.provenance.agency_id = Some(agency_id);
        }
        if let Ok(authority) = std::env::var("GENQUAKEML_AUTHORITY") {
            self.identifiers.authority = authority;
        }
    }

    fn validate(&self) -> Result<()> {
        let authority = self.identifiers.authority.trim();
        if authority.len() < 3 || authority.contains(char::is_whitespace) || authority.contains('/') {
            return Err(GenQuakemlError::Config(format!(
                "identifiers.authority '{}' must be at least 3 characters with no whitespace or '/'",
                self.identifiers.authority
            )));
        }
        if self.output.extension.trim().is_empty() {
            return Err(GenQuakemlError::Config(
                "output.extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
