//! Synthetic event generator: workers that stream timestamped records into a publisher.

pub mod config;
pub mod generators;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod publisher;
pub mod record;
pub mod worker;

pub use config::BeatConfig;
pub use generators::{GeneratorError, GeneratorFactory, GeneratorRegistry, RecordGenerator};
pub use orchestrator::{Orchestrator, RunOptions, RunReport};
pub use publisher::{Publisher, PublishError, Sink, SinkBuilder, SinkKind, SinkOptions};
pub use record::Record;
pub use worker::{Worker, WorkerError, WorkerState, WorkerStats};
