//! Generator abstraction: record generators, their factories, and the registry.

pub mod filebeat;
pub mod lines;
pub mod stub;

use crate::record::Record;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub use filebeat::{FilebeatFactory, FilebeatGenerator, FilebeatSettings};
pub use lines::LineSource;
pub use stub::UnimplementedFactory;

#[derive(thiserror::Error, Debug)]
pub enum GeneratorError {
    #[error("unknown generator: {0}")]
    UnknownGenerator(String),
    #[error("{0}")]
    NotImplemented(String),
    #[error("invalid settings for {kind}: {reason}")]
    InvalidSettings { kind: String, reason: String },
    #[error("sample file {}: {source}", .path.display())]
    SampleFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("sample corpus is empty")]
    EmptyCorpus,
    #[error("no generators configured")]
    NoGenerators,
}

impl GeneratorError {
    /// Errors caused by the configuration itself rather than the environment
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownGenerator(_) | Self::InvalidSettings { .. } | Self::NoGenerators
        )
    }
}

/// Produces one record per call. Each instance is owned by exactly one worker.
pub trait RecordGenerator: Send {
    /// Generator kind tag stamped on every record
    fn kind(&self) -> &str;
    fn generate(&mut self) -> Record;
}

/// Builds the generators for one configured kind from its own settings sub-tree.
pub trait GeneratorFactory: Send + Sync {
    fn build(
        &self,
        settings: &serde_yaml::Value,
    ) -> Result<Vec<Box<dyn RecordGenerator>>, GeneratorError>;
}

/// Maps generator kind names to factories. Lookup is by exact name.
#[derive(Default)]
pub struct GeneratorRegistry {
    factories: BTreeMap<String, Box<dyn GeneratorFactory>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in kind
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(filebeat::KIND, FilebeatFactory);
        registry.register("topbeat", UnimplementedFactory::new("topbeat"));
        registry.register("packetbeat", UnimplementedFactory::new("packetbeat"));
        registry
    }

    /// Register a factory, replacing any previous one under the same name
    pub fn register(&mut self, name: impl Into<String>, factory: impl GeneratorFactory + 'static) {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn build(
        &self,
        name: &str,
        settings: &serde_yaml::Value,
    ) -> Result<Vec<Box<dyn RecordGenerator>>, GeneratorError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| GeneratorError::UnknownGenerator(name.to_string()))?;
        factory.build(settings)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
