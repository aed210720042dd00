//! Water Market - Entry Point
//!
//! Loads a scenario file, runs the central planner for each configured
//! period and prints either a per-period summary or the full allocation
//! tables as JSON.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use water_market::core::config::ScenarioConfig;
use water_market::core::error::Result;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

/// Allocate land among crops under shared surface and groundwater
#[derive(Parser, Debug)]
#[command(name = "water-market")]
#[command(about = "Greedy land allocation under a surface and groundwater market")]
struct Args {
    /// Scenario file (TOML)
    #[arg(default_value = "data/scenario.toml")]
    scenario: PathBuf,

    /// Override the scenario's tie-break seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of planning periods
    #[arg(long)]
    periods: Option<u32>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log every committed land unit
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let directive = if args.verbose { "water_market=debug" } else { "water_market=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directive)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = ScenarioConfig::load(&args.scenario)?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(periods) = args.periods {
        config.periods = periods;
    }

    tracing::info!(
        scenario = %args.scenario.display(),
        seed = config.seed,
        periods = config.periods,
        "loaded scenario"
    );

    let mut scenario = config.into_scenario()?;
    let tables = scenario.run()?;

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&tables)?),
        Format::Text => {
            for (period, table) in tables.iter().enumerate() {
                println!("=== Period {} ===", period + 1);
                println!("{}", table.summary());
                println!();
            }
            println!(
                "Final groundwater deficit: {:.2}",
                scenario.planner.groundwater.deficit()
            );
        }
    }

    Ok(())
}
