use anyhow::Context;
use chrono::{Duration, NaiveDate};
use clap::{Args, Parser, Subcommand};
use configuration::{Overrides, init_logging, load_config_from};
use reports::{Dataset, Period, ReportAssembler};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

mod render;

/// The main entry point for the MOZG analytics application.
fn main() -> anyhow::Result<()> {
    // MOZG__* overrides and RUST_LOG may come from a .env file; it is optional.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = load_config_from(&cli.config)
        .with_context(|| format!("Failed to load configuration from '{}'", cli.config))?;
    cli.overrides
        .apply(&mut config)
        .context("Invalid command-line override")?;

    // Held until exit so a file writer flushes its buffer.
    let _guard = init_logging(&config.logging).context("Failed to initialise logging")?;

    let dataset = Dataset::from_json_file(&cli.input)
        .with_context(|| format!("Failed to read dataset '{}'", cli.input.display()))?;
    let last_date = dataset
        .last_date()
        .context("The dataset contains no receipts")?;
    info!(
        products = dataset.products.len(),
        receipts = dataset.receipts.len(),
        %last_date,
        "Dataset ready"
    );

    let assembler = ReportAssembler::new(&dataset, &config)?;

    match cli.command {
        Commands::Menu(args) => {
            let report = assembler.menu_report(args.resolve(last_date)?, None)?;
            output(cli.json, &report, render::menu)
        }
        Commands::Basket(args) => {
            let report = assembler.basket_report(args.resolve(last_date)?)?;
            output(cli.json, &report, render::basket)
        }
        Commands::Anomalies(args) => {
            let report = assembler.anomaly_report(args.resolve(last_date)?)?;
            output(cli.json, &report, render::anomalies)
        }
        Commands::Forecast(args) => {
            let forecast = assembler.revenue_forecast(args.resolve(last_date))?;
            output(cli.json, &forecast, render::revenue)
        }
        Commands::Quick(args) => {
            let points = assembler.quick_forecast(args.resolve(last_date))?;
            output(cli.json, &points, |p| render::points("Быстрый прогноз", p))
        }
        Commands::Demand(args) => {
            let report = assembler.demand_forecast(args.resolve(last_date))?;
            output(cli.json, &report, render::demand)
        }
        Commands::Full(args) => {
            let report = assembler.full_report(args.resolve(last_date)?, None)?;
            output(cli.json, &report, render::full)
        }
    }
}

fn output<T: Serialize>(json: bool, value: &T, tables: impl Fn(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        tables(value);
    }
    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Menu, basket, anomaly and forecast analytics over a restaurant's receipts.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON snapshot with `products` and `receipts`.
    #[arg(long, global = true, default_value = "dataset.json")]
    input: PathBuf,

    /// Configuration file; a missing file means built-in defaults.
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    /// Print the result as JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// ABC, XYZ and Go-List analysis of the menu.
    Menu(PeriodArgs),
    /// Market-basket analysis: pairs, cross-sell and category affinity.
    Basket(PeriodArgs),
    /// Detect anomalies in daily, product and hourly series.
    Anomalies(PeriodArgs),
    /// Revenue forecast with seasonality, trend and accuracy.
    Forecast(AsOfArgs),
    /// Short revenue forecast for dashboards.
    Quick(AsOfArgs),
    /// Per-product demand forecast.
    Demand(AsOfArgs),
    /// Menu, basket and anomaly reports for one period.
    Full(PeriodArgs),
}

#[derive(Args)]
struct PeriodArgs {
    /// First day of the period (YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the period; the last day in the dataset by default.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Period length when `--from` is not given.
    #[arg(long, default_value_t = 30)]
    days: usize,
}

impl PeriodArgs {
    fn resolve(&self, last_date: NaiveDate) -> anyhow::Result<Period> {
        let end = self.to.unwrap_or(last_date);
        let start = match self.from {
            Some(from) => from,
            None => end - Duration::days(self.days.max(1) as i64 - 1),
        };
        Period::new(start, end).context("Invalid period")
    }
}

#[derive(Args)]
struct AsOfArgs {
    /// Last day of history; the forecast starts the day after.
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

impl AsOfArgs {
    fn resolve(&self, last_date: NaiveDate) -> NaiveDate {
        self.as_of.unwrap_or(last_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn period_defaults_to_trailing_days() {
        let args = PeriodArgs { from: None, to: None, days: 7 };
        let period = args.resolve(day(30)).unwrap();
        assert_eq!(period.start, day(24));
        assert_eq!(period.end, day(30));
    }

    #[test]
    fn reversed_period_is_an_error() {
        let args = PeriodArgs { from: Some(day(20)), to: Some(day(10)), days: 30 };
        assert!(args.resolve(day(30)).is_err());
    }

    #[test]
    fn cli_parses_overrides_before_the_subcommand() {
        let cli = Cli::try_parse_from([
            "mozg",
            "--min-lift",
            "1.5",
            "--json",
            "basket",
            "--from",
            "2025-06-01",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(cli.overrides.min_lift.is_some());
        assert!(matches!(cli.command, Commands::Basket(PeriodArgs { from: Some(_), .. })));
    }
}
