//! Log-line generator producing filebeat-shaped records.

use super::lines::{self, LineSource};
use super::{GeneratorError, GeneratorFactory, RecordGenerator};
use crate::record::Record;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

pub const KIND: &str = "filebeat";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilebeatSettings {
    /// Number of independent generators (one worker each)
    pub worker: i64,
    /// Lines concatenated into every message
    pub repeat: i64,
    pub sample_file: Option<PathBuf>,
}

impl Default for FilebeatSettings {
    fn default() -> Self {
        Self {
            worker: 1,
            repeat: 1,
            sample_file: None,
        }
    }
}

impl FilebeatSettings {
    pub fn from_value(settings: &serde_yaml::Value) -> Result<Self, GeneratorError> {
        let parsed: Self = if settings.is_null() {
            Self::default()
        } else {
            serde_yaml::from_value(settings.clone()).map_err(|e| invalid(e.to_string()))?
        };
        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> Result<(), GeneratorError> {
        if self.worker < 1 {
            return Err(invalid(format!("worker must be >= 1, got {}", self.worker)));
        }
        if self.repeat < 1 {
            return Err(invalid(format!("repeat must be >= 1, got {}", self.repeat)));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> GeneratorError {
    GeneratorError::InvalidSettings {
        kind: KIND.to_string(),
        reason,
    }
}

pub struct FilebeatFactory;

impl GeneratorFactory for FilebeatFactory {
    fn build(
        &self,
        settings: &serde_yaml::Value,
    ) -> Result<Vec<Box<dyn RecordGenerator>>, GeneratorError> {
        let settings = FilebeatSettings::from_value(settings)?;

        let corpus: Arc<[String]> = match &settings.sample_file {
            Some(path) => {
                tracing::info!(path = %path.display(), "Read sample file");
                lines::read_sample_file(path)?
            }
            None => lines::default_corpus(),
        };

        let repeat = settings.repeat as usize;
        (0..settings.worker)
            .map(|_| -> Result<Box<dyn RecordGenerator>, GeneratorError> {
                let source = LineSource::new(Arc::clone(&corpus))?;
                Ok(Box::new(FilebeatGenerator::new(source, repeat)))
            })
            .collect()
    }
}

/// One line source plus the running byte offset of everything it emitted.
#[derive(Debug)]
pub struct FilebeatGenerator {
    source: LineSource,
    repeat: usize,
    offset: u64,
}

impl FilebeatGenerator {
    pub fn new(source: LineSource, repeat: usize) -> Self {
        Self {
            source,
            repeat,
            offset: 0,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl RecordGenerator for FilebeatGenerator {
    fn kind(&self) -> &str {
        KIND
    }

    fn generate(&mut self) -> Record {
        let message = self.source.next_text(self.repeat);
        let offset = self.offset;
        self.offset += message.len() as u64;
        Record::new(KIND, message, offset)
    }
}
