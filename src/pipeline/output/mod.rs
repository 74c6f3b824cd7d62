// Serialization of the assembled catalog and the file write

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::domain::Catalog;
use crate::error::{GenQuakemlError, Result};

pub mod quakeml;
pub mod sc3ml;
mod xml_document;

pub use quakeml::QuakeMlSerializer;
pub use sc3ml::Sc3mlSerializer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[value(name = "quakeml")]
    QuakeMl,
    Sc3ml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::QuakeMl => write!(f, "QuakeML"),
            OutputFormat::Sc3ml => write!(f, "SC3ML"),
        }
    }
}

/// Extra XML namespaces (prefix to URI) to declare on the document root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMap {
    entries: BTreeMap<String, String>,
}

impl NamespaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.entries.insert(prefix.into(), uri.into());
    }

    pub fn uri(&self, prefix: &str) -> Option<&str> {
        self.entries.get(prefix).map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Turns an assembled catalog into document bytes
pub trait CatalogSerializer {
    fn format(&self) -> OutputFormat;
    fn serialize(&self, catalog: &Catalog, namespaces: &NamespaceMap) -> Result<Vec<u8>>;
}

pub fn serializer_for(format: OutputFormat, indent: bool) -> Box<dyn CatalogSerializer> {
    match format {
        OutputFormat::QuakeMl => Box::new(QuakeMlSerializer { indent }),
        OutputFormat::Sc3ml => Box::new(Sc3mlSerializer { indent }),
    }
}

/// Write `bytes` to `path` through a temporary file in the same directory so
/// that an existing file is only replaced by a complete document.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !directory.is_dir() {
        return Err(GenQuakemlError::file(directory, "output directory does not exist"));
    }

    let mut temp = tempfile::NamedTempFile::new_in(directory)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    debug!("Wrote {} bytes to {}", bytes.len(), temp.path().display());
    temp.persist(path).map_err(|e| e.error)?;
    info!("Catalog written to {}", path.display());
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_write_atomically_replaces_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("event.xml");
        fs::write(&path, "old").unwrap();
        write_atomically(&path, b"<new/>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<new/>");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomically_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("event.xml");
        assert!(matches!(
            write_atomically(&path, b"<x/>"),
            Err(GenQuakemlError::File { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_output_format_from_config_value() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: OutputFormat,
        }
        let parsed: Wrapper = toml::from_str("format = \"quakeml\"").unwrap();
        assert_eq!(parsed.format, OutputFormat::QuakeMl);
        let parsed: Wrapper = toml::from_str("format = \"sc3ml\"").unwrap();
        assert_eq!(parsed.format, OutputFormat::Sc3ml);
    }
}
