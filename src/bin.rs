//! Binary entry point for `pvz-event-bot`.
//!
//! This module provides the command-line interface for the event bot with options
//! for configuration file paths and logging verbosity. It initializes the
//! necessary components and starts the service.

use clap::Parser;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use pvz_event_bot::{
    base::{config::Config, types::Void},
    generator::{EventGenerator, catalog::Catalog, random::RandomProvider},
};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// pvz-event-bot – random pickup-point events for a Telegram chat.
///
/// Configuration can come from `config.toml` or environment variables
/// prefixed with `EVENT_BOT_`. The bot answers `/generate` on demand and
/// posts an event to the registered chat on a fixed interval.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// Override the config file path (optional).
    ///
    /// By default, the bot will look for a config file at `.hidden/config.toml`
    /// in the current directory.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Export spans over OTLP/HTTP to the collector configured by the
    /// standard `OTEL_EXPORTER_OTLP_*` environment variables.
    #[arg(long)]
    otel: bool,
    /// Print a single generated event and exit, without contacting Telegram.
    #[arg(long)]
    once: bool,
    /// Catalog file to use with `--once` instead of the built-in one.
    #[arg(long, requires = "once")]
    catalog: Option<std::path::PathBuf>,
    /// Seed for reproducible output with `--once`.
    #[arg(long, requires = "once")]
    seed: Option<u64>,
}

/// Main entry point for the event bot binary.
///
/// Sets up logging based on verbosity, loads configuration, and starts the bot.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    // Prepare the otlp layer.

    let otel = if args.otel {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("pvz-event-bot");
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry().with(otel).with(level_filter).with(stdout).init();

    if args.once {
        let mut generator = EventGenerator::new(Catalog::load(args.catalog.as_deref())?);

        if let Some(seed) = args.seed {
            generator = generator.with_random_provider(RandomProvider::seeded(seed));
        }

        println!("{}", generator.generate_event());

        return Ok(());
    }

    let config = Config::load(args.config.as_deref())?;

    pvz_event_bot::start(config).await
}
