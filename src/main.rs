//! Pro forma engine CLI
//!
//! Command-line interface for running deal projections
//!
//! ```bash
//! # Ten-year pro forma from a scenario file, forecast rows to CSV
//! proforma --scenario data/scenarios/strip_center.json project --output forecast.csv
//!
//! # IRR by exit cap and vacancy
//! proforma sensitivity --x-field exitCapRate --x-values 5.5,6,6.5,7 \
//!     --y-field operations.vacancyRate --y-values 10,5,0
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use proforma_engine::inputs::loader::load_scenario;
use proforma_engine::inputs::validation::collect_errors;
use proforma_engine::inputs::PropertyTemplate;
use proforma_engine::projection::{compare_loans, LoanOption};
use proforma_engine::scenario::{SensitivityGrid, SensitivityVariable};
use proforma_engine::{score, DealInputs, InputField, MetricName, ProjectionEngine, Scenario, ScenarioRunner};

/// Real-estate pro forma, exit valuation and deal scoring
#[derive(Parser)]
#[command(name = "proforma")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scenario JSON file; defaults fill anything missing (all defaults when omitted)
    #[arg(short, long, global = true)]
    scenario: Option<PathBuf>,

    /// Apply a property-type template (multifamily, retail, office, industrial)
    #[arg(short, long, global = true)]
    template: Option<PropertyTemplate>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full projection and print metrics
    Project {
        /// Write forecast rows to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Evaluate a metric over a two-field grid
    Sensitivity {
        /// Canned grid; overrides the explicit axes
        #[arg(long, value_enum)]
        preset: Option<Preset>,

        /// X-axis field path, e.g. exitCapRate or operations.vacancyRate
        #[arg(long, default_value = "exitCapRate")]
        x_field: String,

        /// X-axis values (defaults to the field's standard sweep)
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        x_values: Vec<f64>,

        /// Y-axis field path
        #[arg(long, default_value = "operations.annualRentGrowth")]
        y_field: String,

        /// Y-axis values (defaults to the field's standard sweep, high to low)
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        y_values: Vec<f64>,

        /// Metric to evaluate in each cell
        #[arg(short, long, default_value = "irr")]
        metric: String,

        /// Evaluate cells on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// Grade the deal from its after-tax returns
    Score,

    /// Compare financing alternatives for the scenario's loan amount
    Loans {
        /// Loan option as name:rate:termYears:points (repeatable)
        #[arg(short, long = "option", value_parser = parse_loan_option, required = true)]
        options: Vec<LoanOption>,
    },

    /// Check inputs against form-level rules
    Validate,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// IRR by purchase price against exit cap rate
    PriceExitCap,
    /// Average cash-on-cash by base rent against vacancy
    RentVacancy,
}

fn parse_loan_option(s: &str) -> std::result::Result<LoanOption, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 4 {
        return Err(format!("expected name:rate:termYears:points, got '{}'", s));
    }

    let rate = parts[1].parse::<f64>().map_err(|e| format!("rate: {}", e))?;
    let term = parts[2].parse::<u32>().map_err(|e| format!("term: {}", e))?;
    let points = parts[3].parse::<f64>().map_err(|e| format!("points: {}", e))?;
    Ok(LoanOption::new(parts[0], rate, term, points))
}

fn load_inputs(cli: &Cli) -> Result<Scenario> {
    let mut scenario = match &cli.scenario {
        Some(path) => load_scenario(path)
            .with_context(|| format!("Failed to load scenario {}", path.display()))?,
        None => Scenario::new("Defaults", DealInputs::default()),
    };

    if let Some(template) = cli.template {
        log::info!("Applying {} template", template.name());
        scenario.inputs = template.apply(&scenario.inputs);
    }

    Ok(scenario)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let scenario = load_inputs(&cli)?;

    match &cli.command {
        Commands::Project { output } => run_project(&cli, &scenario, output.as_ref()),
        Commands::Sensitivity {
            preset,
            x_field,
            x_values,
            y_field,
            y_values,
            metric,
            sequential,
        } => {
            let runner = ScenarioRunner::new(scenario.inputs.clone()).parallel(!*sequential);
            let grid = match preset {
                Some(Preset::PriceExitCap) => runner.price_exit_cap_grid(),
                Some(Preset::RentVacancy) => runner.rent_vacancy_grid(),
                None => explicit_grid(&runner, x_field, x_values, y_field, y_values, metric)?,
            };
            if cli.json {
                print_json(&grid)
            } else {
                print_grid(&grid);
                Ok(())
            }
        }
        Commands::Score => {
            let result = ProjectionEngine::default().project(&scenario.inputs);
            let deal_score = score(&result.metrics);
            if cli.json {
                return print_json(&deal_score);
            }
            println!("{}: grade {} ({}/100)", scenario.name, deal_score.grade, deal_score.score);
            let b = &deal_score.breakdown;
            for (label, c) in [
                ("IRR", b.irr),
                ("Cash-on-cash", b.cash_on_cash),
                ("Equity multiple", b.equity_multiple),
            ] {
                println!("  {:<16} {:>3} x {}%", label, c.score, c.weight);
            }
            Ok(())
        }
        Commands::Loans { options } => {
            let inputs = &scenario.inputs;
            let loan_amount = inputs.financing.loan_amount(inputs.property.purchase_price);
            let rows = compare_loans(loan_amount, options);
            if cli.json {
                return print_json(&rows);
            }
            println!("Loan amount: ${:.2}", loan_amount);
            println!(
                "{:<16} {:>12} {:>12} {:>14} {:>14} {:>9}",
                "Option", "Payment", "Points", "Interest", "Total", "Eff. %"
            );
            for r in &rows {
                println!(
                    "{:<16} {:>12.2} {:>12.2} {:>14.2} {:>14.2} {:>9.3}",
                    r.name, r.monthly_payment, r.points_cost, r.total_interest, r.total_cost, r.effective_rate
                );
            }
            Ok(())
        }
        Commands::Validate => {
            let errors = collect_errors(&scenario.inputs);
            if errors.is_empty() {
                println!("{}: inputs valid", scenario.name);
                Ok(())
            } else {
                for e in &errors {
                    println!("  {}", e);
                }
                anyhow::bail!("{} validation error(s) in {}", errors.len(), scenario.name)
            }
        }
    }
}

fn run_project(cli: &Cli, scenario: &Scenario, output: Option<&PathBuf>) -> Result<()> {
    let result = ProjectionEngine::default().project(&scenario.inputs);

    if let Some(path) = output {
        let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
        result
            .write_forecast_csv(BufWriter::new(file))
            .context("Failed to write forecast CSV")?;
        log::info!("Forecast written to {}", path.display());
    }

    if cli.json {
        return print_json(&result);
    }

    println!("{} ({} mode)", scenario.name, scenario.inputs.input_mode());
    println!("{}", "=".repeat(scenario.name.len() + 15));
    println!(
        "{:>4} {:>14} {:>14} {:>14} {:>14} {:>14} {:>8}",
        "Year", "EGI", "Expenses", "NOI", "Cash Flow", "After Tax", "CoC %"
    );
    for row in &result.forecast {
        println!(
            "{:>4} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>8.2}",
            row.year,
            row.effective_gross_income,
            row.total_expenses,
            row.noi,
            row.cash_flow,
            row.cash_flow_after_tax,
            row.cash_on_cash
        );
    }

    let m = &result.metrics;
    println!();
    println!("Total initial investment: ${:.2}", m.total_initial_investment);
    println!("IRR (pre-tax / after-tax): {:.2}% / {:.2}%", m.irr, m.irr_after_tax);
    println!("Equity multiple:          {:.2}x / {:.2}x", m.equity_multiple, m.equity_multiple_after_tax);
    println!("Avg cash-on-cash:         {:.2}% / {:.2}%", m.average_cash_on_cash, m.average_cash_on_cash_after_tax);
    println!("NPV after tax:            ${:.2}", m.npv_after_tax);
    println!("Cap rate:                 {:.2}%", m.cap_rate);
    if m.dscr.is_finite() {
        println!("DSCR:                     {:.2}", m.dscr);
    } else {
        println!("DSCR:                     n/a (no debt)");
    }
    println!("Sale price:               ${:.2}", m.exit_analysis.gross_sale_price);
    println!("Net cash from sale:       ${:.2}", m.net_cash_from_sale);
    println!("Total profit:             ${:.2}", m.total_profit);

    Ok(())
}

fn explicit_grid(
    runner: &ScenarioRunner,
    x_field: &str,
    x_values: &[f64],
    y_field: &str,
    y_values: &[f64],
    metric: &str,
) -> Result<SensitivityGrid> {
    let x: InputField = x_field.parse()?;
    let y: InputField = y_field.parse()?;
    let metric: MetricName = metric.parse()?;

    let sweep = |field: InputField| {
        SensitivityVariable::for_field(field)
            .map(|v| v.values())
            .with_context(|| format!("No standard sweep for {}; pass values explicitly", field))
    };

    let xs = if x_values.is_empty() { sweep(x)? } else { x_values.to_vec() };
    let ys = if y_values.is_empty() {
        let mut ys = sweep(y)?;
        ys.reverse();
        ys
    } else {
        y_values.to_vec()
    };

    let values = runner.sensitivity_grid(x, &xs, y, &ys, metric);
    Ok(SensitivityGrid {
        x_field: x.to_string(),
        x_values: xs,
        y_field: y.to_string(),
        y_values: ys,
        metric: metric.to_string(),
        values,
    })
}

fn print_grid(grid: &SensitivityGrid) {
    println!("{} by {} (rows) / {} (columns)", grid.metric, grid.y_field, grid.x_field);

    print!("{:>12}", "");
    for x in &grid.x_values {
        print!(" {:>10.2}", x);
    }
    println!();

    for (y, row) in grid.y_values.iter().zip(&grid.values) {
        print!("{:>12.2}", y);
        for cell in row {
            match cell {
                Some(v) => print!(" {:>10.2}", v),
                None => print!(" {:>10}", "N/A"),
            }
        }
        println!();
    }
}
