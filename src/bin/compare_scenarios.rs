//! Compare a set of scenario files side by side
//!
//! Loads each scenario (missing fields from defaults), projects them in
//! parallel and writes one summary row per scenario.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;

use proforma_engine::inputs::loader::load_scenario;
use proforma_engine::{Scenario, ScenarioRunner};

#[derive(Parser)]
#[command(name = "compare_scenarios", about = "Side-by-side metrics for scenario files")]
struct Args {
    /// Scenario JSON files
    #[arg(required = true)]
    scenarios: Vec<PathBuf>,

    /// Summary CSV path
    #[arg(short, long, default_value = "scenario_comparison.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    let scenarios: Vec<Scenario> = args
        .scenarios
        .par_iter()
        .map(|path| load_scenario(path).with_context(|| format!("Failed to load {}", path.display())))
        .collect::<Result<_>>()?;
    println!("Loaded {} scenarios in {:?}", scenarios.len(), start.elapsed());

    let rows = ScenarioRunner::default().compare(&scenarios);

    println!(
        "{:<28} {:>14} {:>8} {:>8} {:>8} {:>8} {:>14} {:>5} {:>5}",
        "Scenario", "Investment", "IRR %", "AT IRR", "CoC %", "EM", "Profit", "Grade", "Score"
    );
    for r in &rows {
        println!(
            "{:<28} {:>14.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>14.2} {:>5} {:>5}",
            r.name,
            r.total_initial_investment,
            r.irr,
            r.irr_after_tax,
            r.average_cash_on_cash,
            r.equity_multiple,
            r.total_profit,
            r.grade,
            r.score
        );
    }

    let mut wtr = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    for r in &rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;

    println!("\nComparison written to: {}", args.output.display());
    Ok(())
}
