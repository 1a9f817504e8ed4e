use super::{GeneratorError, GeneratorFactory, RecordGenerator};

/// Placeholder for generator kinds that are reserved but not built yet.
///
/// Always fails, whatever settings it receives.
#[derive(Debug, Clone)]
pub struct UnimplementedFactory {
    kind: String,
}

impl UnimplementedFactory {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

impl GeneratorFactory for UnimplementedFactory {
    fn build(
        &self,
        _settings: &serde_yaml::Value,
    ) -> Result<Vec<Box<dyn RecordGenerator>>, GeneratorError> {
        Err(GeneratorError::NotImplemented(format!(
            "{} mode not yet implemented",
            self.kind
        )))
    }
}
