//! Beat configuration file: which generator kinds to run and their settings.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("reading config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error reading config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Top-level document. Generator settings stay raw so that only the owning
/// factory interprets them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BeatConfig {
    #[serde(default)]
    pub generatorbeat: GeneratorbeatConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratorbeatConfig {
    #[serde(default)]
    pub generators: BTreeMap<String, serde_yaml::Value>,
}

impl BeatConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        // An empty document parses as null
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Single-kind config, mainly for embedding and tests
    pub fn single(kind: &str, settings: serde_yaml::Value) -> Self {
        let mut cfg = Self::default();
        cfg.generatorbeat.generators.insert(kind.to_string(), settings);
        cfg
    }

    pub fn generators(&self) -> &BTreeMap<String, serde_yaml::Value> {
        &self.generatorbeat.generators
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generator_subtrees() {
        let cfg = BeatConfig::from_yaml_str(
            r#"
generatorbeat:
  generators:
    filebeat:
      worker: 2
      repeat: 3
    topbeat:
"#,
        )
        .unwrap();
        let gens = cfg.generators();
        assert_eq!(gens.len(), 2);
        assert_eq!(gens["filebeat"]["worker"].as_i64(), Some(2));
        assert!(gens["topbeat"].is_null());
    }

    #[test]
    fn empty_document_has_no_generators() {
        assert!(BeatConfig::from_yaml_str("").unwrap().generators().is_empty());
        assert!(BeatConfig::from_yaml_str("generatorbeat: {}").unwrap().generators().is_empty());
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let err = BeatConfig::from_yaml_str("generatorbeat:\n  generators: [filebeat").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = BeatConfig::load("/nonexistent/generatorbeat.yml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
