//! Headless Frontline runner
//!
//! Loads a scenario, runs it for a number of clock invocations and prints
//! either a text summary or the final snapshot as JSON.

use std::path::PathBuf;

use clap::Parser;
use frontline::core::error::Result;
use frontline::scenario::{load_scenario, Scenario};
use frontline::simulation::Simulation;

/// Headless Frontline runner
#[derive(Parser, Debug)]
#[command(name = "frontline_sim")]
#[command(about = "Run a frontline scenario headless and report the outcome")]
struct Args {
    /// Clock invocations to run
    #[arg(long, default_value_t = 240)]
    ticks: u32,

    /// Ticks per invocation (overrides the scenario)
    #[arg(long)]
    speed: Option<f64>,

    /// Random seed for deterministic runs (overrides the scenario)
    #[arg(long)]
    seed: Option<u64>,

    /// Scenario file; the built-in 1939 western front when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Print the final snapshot as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("frontline=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut scenario = match &args.scenario {
        Some(path) => load_scenario(path)?,
        None => Scenario::builtin()?,
    };
    if let Some(speed) = args.speed {
        scenario.config.speed_multiplier = speed;
    }
    let seed = args.seed.or(scenario.config.seed).unwrap_or_else(rand::random);
    scenario.config.seed = Some(seed);
    scenario.config.validate()?;

    let mut sim = Simulation::new(scenario)?;

    let mut major_events = Vec::new();
    let mut minor_count = 0usize;
    for _ in 0..args.ticks {
        sim.advance(&mut |message: &str, major: bool| {
            if major {
                major_events.push(message.to_string());
            } else {
                minor_count += 1;
            }
        });
    }

    let snapshot = sim.snapshot();
    if args.json {
        println!("{}", snapshot.to_json()?);
        return Ok(());
    }

    println!("=== FRONTLINE ===");
    println!("Seed {} | tick {} | {}", seed, snapshot.tick, snapshot.date);
    println!();

    let units = snapshot.unit_counts();
    println!("{:<16} {:>6} {:>8}", "Country", "Units", "Cells");
    for country in frontline::scenario::Country::ALL {
        let unit_count = units.get(&country).copied().unwrap_or(0);
        let cells = snapshot.territory.get(&country).copied().unwrap_or(0);
        if unit_count == 0 && cells == 0 {
            continue;
        }
        println!("{:<16} {:>6} {:>8}", country.name(), unit_count, cells);
    }
    println!();
    println!("Active battles: {}", snapshot.battles.len());
    println!("Major events: {} | minor events: {}", major_events.len(), minor_count);

    for message in major_events.iter().rev().take(10).rev() {
        println!("  {}", message);
    }

    Ok(())
}
