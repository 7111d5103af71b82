//! Busload CLI - resource-usage conformance runs against the in-memory bus

mod logging;
mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use busload_core::application::{HarnessConfig, QueueManager, ResourceUsageHarness, ServiceBusBuilder};
use busload_core::domain::limit_from;
use busload_core::port::CpuProbe;
use busload_infra_memory::MemoryQueueFactory;
use busload_infra_system::SysinfoCpuProbe;
use logging::LogFormat;

#[derive(Parser)]
#[command(name = "busload")]
#[command(about = "Resource-usage conformance harness for bus worker pools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log output format (logs go to stderr)
    #[arg(long, env = "BUSLOAD_LOG_FORMAT", value_enum, default_value = "pretty", global = true)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the CPU envelope check against a worker pool
    Run(RunArgs),

    /// Measure the CPU baseline and the envelope limit it implies
    Baseline {
        /// Percentage points allowed above baseline
        #[arg(long, env = "BUSLOAD_MARGIN", default_value = "25")]
        margin: f32,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args)]
struct RunArgs {
    /// Worker count
    #[arg(short, long, env = "BUSLOAD_THREADS", default_value = "5")]
    threads: usize,

    /// Wall-clock window for the whole run (e.g. 10s, 1m)
    #[arg(short, long, env = "BUSLOAD_DURATION", default_value = "10s", value_parser = humantime::parse_duration)]
    duration: Duration,

    /// Messages enqueued per iteration
    #[arg(short, long, env = "BUSLOAD_LOAD", default_value = "5")]
    load: usize,

    /// Worker naps between empty polls, comma separated; the last repeats
    #[arg(
        long,
        env = "BUSLOAD_IDLE_SLEEP",
        default_value = "1s",
        value_delimiter = ',',
        value_parser = humantime::parse_duration
    )]
    idle_sleep: Vec<Duration>,

    /// Delay between CPU samples while waiting for idle workers
    #[arg(long, env = "BUSLOAD_POLL_INTERVAL", default_value = "25ms", value_parser = humantime::parse_duration)]
    poll_interval: Duration,

    /// Frame dequeues transactionally
    #[arg(long, env = "BUSLOAD_TRANSACTIONAL")]
    transactional: bool,

    /// Queue URI template with one `{}` placeholder
    #[arg(long, env = "BUSLOAD_QUEUE_URI_TEMPLATE", default_value = "memory://./{}")]
    queue_uri_template: String,

    /// Percentage points allowed above baseline
    #[arg(long, env = "BUSLOAD_MARGIN", default_value = "25")]
    margin: f32,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
}

impl RunArgs {
    fn harness_config(&self) -> HarnessConfig {
        HarnessConfig {
            thread_count: self.threads,
            duration: self.duration,
            load_per_iteration: self.load,
            idle_sleep_schedule: self.idle_sleep.clone(),
            poll_interval: self.poll_interval,
            is_transactional: self.transactional,
            queue_uri_template: self.queue_uri_template.clone(),
            margin: self.margin,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_format)?;

    info!("Busload v{} starting...", busload_core::VERSION);

    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Baseline { margin } => baseline(margin).await,
    }
}

async fn run(args: RunArgs) -> Result<ExitCode> {
    let config = args.harness_config();

    // DI wiring
    let queue_manager = QueueManager::new().with_factory(Arc::new(MemoryQueueFactory::new()));
    let harness = ResourceUsageHarness::new(
        Arc::new(queue_manager),
        Arc::new(SysinfoCpuProbe::new()),
        Arc::new(ServiceBusBuilder),
    );

    let report = harness.run(&config).await;

    match args.output {
        OutputFormat::Text => output::print_text(&config, &report),
        OutputFormat::Json => output::print_json(&report).context("Failed to render report")?,
    }

    Ok(ExitCode::from(report.outcome.exit_code()))
}

async fn baseline(margin: f32) -> Result<ExitCode> {
    let probe = SysinfoCpuProbe::new();

    match probe.baseline().await {
        Ok(baseline) => {
            println!("  {} {:.2} %", "Baseline:".bold(), baseline);
            println!("  {} {:.2} %", "Limit:".bold(), limit_from(baseline, margin));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", format!("○ Skipped: {}", e).yellow());
            Ok(ExitCode::SUCCESS)
        }
    }
}
