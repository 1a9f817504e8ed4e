use anyhow::{Context, Result, bail};
use clap::Parser;
use generatorbeat::publisher::{SinkBuilder, SinkOptions, parse_sink_kind, parse_sink_kv};
use generatorbeat::{BeatConfig, GeneratorRegistry, Orchestrator, RunOptions, logging};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Instrument;

#[derive(Parser)]
#[command(name = "generatorbeat")]
#[command(about = "Synthetic event generator for load testing beat pipelines")]
struct Cli {
    /// Run ID for tagging log output
    #[arg(long, default_value = "")]
    run_id: String,

    /// Configuration file
    #[arg(short, long, default_value = "generatorbeat.yml")]
    config: PathBuf,

    /// Quit after each worker pushed `max` events. Unset or negative runs until stopped
    #[arg(long, allow_hyphen_values = true)]
    max: Option<i64>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Where records go (stdout/file/discard)
    #[arg(long, default_value = "stdout")]
    output: String,

    /// Output file for the `file` sink
    #[arg(long)]
    output_path: Option<String>,

    /// Extra sink options as key=value
    #[arg(long = "output-opt")]
    output_opts: Vec<String>,

    /// Stop automatically after this many seconds
    #[arg(long)]
    duration: Option<u64>,

    /// Interval in seconds for the periodic stats log line (0 disables it)
    #[arg(long, default_value = "10")]
    stats_interval: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level)?;

    let run_id = if cli.run_id.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        cli.run_id.clone()
    };
    run(cli)
        .instrument(tracing::info_span!("generatorbeat", run_id = %run_id))
        .await
}

async fn run(cli: Cli) -> Result<()> {
    let config = BeatConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let mut options = RunOptions::default().with_max_flag(cli.max);
    if cli.stats_interval > 0 {
        options = options.with_stats_interval(Duration::from_secs(cli.stats_interval));
    }

    let registry = GeneratorRegistry::with_defaults();
    let orchestrator =
        Orchestrator::build(&config, &registry, options).context("resolving generators")?;

    let Some(kind) = parse_sink_kind(&cli.output) else {
        bail!("unknown output: {}", cli.output);
    };
    let mut sink_opts: SinkOptions = parse_sink_kv(&cli.output_opts);
    if let Some(path) = cli.output_path {
        sink_opts = sink_opts.with("path", path);
    }
    let sink = SinkBuilder::connect(kind, sink_opts)
        .await
        .context("connecting output")?;

    tracing::info!(
        config = %cli.config.display(),
        workers = orchestrator.worker_count(),
        output = %cli.output,
        "Starting generatorbeat"
    );

    let report = match cli.duration {
        Some(secs) => {
            orchestrator
                .run_with_timeout(sink.as_ref(), Duration::from_secs(secs))
                .await?
        }
        None => orchestrator.run_with_signal_handling(sink.as_ref()).await?,
    };

    if !report.is_clean() {
        bail!("{} worker(s) failed", report.failures.len());
    }
    Ok(())
}
