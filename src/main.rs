//! PRNG Seed CLI
//!
//! Runs one seeding pass over the configured sources and reports how
//! much entropy went into the PRNG.

use clap::{Parser, ValueEnum};
use prng_seed::{
    diagnostics::{SeedingMetrics, TracingSink},
    prng::SharedPrng,
    seeding::Seeder,
    source::{FileConfig, SeedContext},
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ContextArg {
    Startup,
    Connect,
}

impl From<ContextArg> for SeedContext {
    fn from(arg: ContextArg) -> Self {
        match arg {
            ContextArg::Startup => SeedContext::Startup,
            ContextArg::Connect => SeedContext::Connect,
        }
    }
}

/// Seed a PRNG from configured entropy sources.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML file listing the seed sources. Builtin sources only if omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Which sources to run.
    #[arg(long, value_enum, default_value_t = ContextArg::Startup)]
    context: ContextArg,

    /// Label prepended to the diagnostics.
    #[arg(long, default_value = "")]
    prefix: String,

    /// Print Prometheus metrics after the pass.
    #[arg(long)]
    metrics: bool,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("PRNG seed v{}", prng_seed::VERSION);

    let config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            info!("No configuration given, using builtin sources only");
            FileConfig::builtin_only()
        }
    };

    let metrics = match SeedingMetrics::new() {
        Ok(metrics) => metrics,
        Err(e) => {
            eprintln!("Failed to create metrics registry: {}", e);
            std::process::exit(1);
        }
    };

    let prng = SharedPrng::new(&config.prng);
    let seeder = Seeder::new(config.sources, &prng).with_sink((TracingSink, &metrics));

    let context = SeedContext::from(args.context);
    let total = seeder.seed(context, &args.prefix);
    info!(
        "Seeded {} bytes for {} ({} of {} bytes of entropy credited)",
        total,
        context,
        prng.entropy_bytes(),
        prng.min_entropy_bytes()
    );

    let mut output = [0u8; 32];
    match prng.fill_bytes(&mut output) {
        Ok(()) => println!(
            "Random bytes: {}",
            output
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<String>()
        ),
        Err(e) => warn!("No output drawn: {}", e),
    }

    if args.metrics {
        match metrics.encode() {
            Ok(text) => print!("{}", text),
            Err(e) => warn!("Failed to encode metrics: {}", e),
        }
    }
}
