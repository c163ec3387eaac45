use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{debug, info};

use cyclecast::config::AppConfig;
use cyclecast::display;
use cyclecast::import;
use cyclecast::logging::{init_logging, LogLevel};
use cyclecast::models::{Temperature, UnitSystem};
use cyclecast::{ComfortScorer, CycleCastError, ForecastAggregator, TrainingLoadAnalyzer};

/// CycleCast - Ride Comfort and Training Load CLI
///
/// Scores hourly weather forecasts for riding comfort and tracks fitness,
/// fatigue and form (CTL, ATL, TSB) from ride history.
#[derive(Parser)]
#[command(name = "cyclecast")]
#[command(author = "CycleCast Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Ride Comfort and Training Load CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a forecast file and recommend ride windows
    Forecast {
        /// Forecast JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Unit system for scoring and display (imperial, metric)
        #[arg(short, long)]
        units: Option<UnitSystem>,

        /// Ideal riding temperature in the chosen units
        #[arg(short, long)]
        ideal_temp: Option<f64>,

        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute fitness, fatigue and form from ride history
    Load {
        /// Ride history CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Number of weeks in the breakdown table
        #[arg(short, long, default_value = "4")]
        weeks: usize,

        /// Weekly TSS target
        #[arg(short, long)]
        target: Option<Decimal>,

        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,

        /// Emit only the compact widget payload as JSON
        #[arg(long)]
        widget: bool,
    },

    /// Show or initialize the configuration file
    Config {
        /// Print the active configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default configuration file
        #[arg(short, long)]
        init: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        let message = match err.downcast_ref::<CycleCastError>() {
            Some(app_err) => app_err.user_message(),
            None => format!("{:#}", err),
        };
        eprintln!("{} {}", "Error:".red().bold(), message);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load_or_default(cli.config.as_deref());

    config.logging.level = LogLevel::from_verbosity(config.logging.level, cli.verbose);
    init_logging(&config.logging)?;
    debug!(preferences = ?config.preferences, "Configuration resolved");

    match cli.command {
        Commands::Forecast {
            file,
            units,
            ideal_temp,
            json,
        } => {
            let units = units.unwrap_or(config.preferences.units);
            let ideal = match ideal_temp {
                Some(value) => Temperature::from_units(value, units),
                None => config.preferences.ideal_temperature(),
            };

            let samples = import::load_forecast_json(&file)?;
            let scorer = ComfortScorer::with_ideal_temperature(units, ideal);
            let scored = scorer.score_all(&samples);
            let summary = ForecastAggregator::new(scorer).summarize_scored(&scored);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", "Ride forecast".green().bold());
                println!("{}", display::forecast_table(&scored, units));
                println!("{}", display::forecast_report(&summary));
            }
        }

        Commands::Load {
            file,
            weeks,
            target,
            json,
            widget,
        } => {
            if weeks == 0 {
                return Err(
                    CycleCastError::Validation("--weeks must be at least 1".to_string()).into(),
                );
            }

            let mut training = config.training.clone();
            if let Some(target) = target {
                training.weekly_target_tss = target;
            }

            let rides = import::load_rides_csv(&file)?;
            let analyzer = TrainingLoadAnalyzer::with_config(training);
            let series = analyzer.compute_series_from_rides(&rides);
            let summary = analyzer.summarize(&series);
            info!(rides = rides.len(), days = series.len(), "Computed training load");

            if widget {
                println!("{}", serde_json::to_string(&summary.widget_payload())?);
            } else if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                let breakdown = analyzer.weekly_breakdown(&series, weeks);
                let recommendations = analyzer.recommendations(&summary);

                println!("{}", "Training load".blue().bold());
                println!("{}", display::training_report(&summary, &recommendations));
                if !breakdown.is_empty() {
                    println!();
                    println!(
                        "{}",
                        display::weekly_table(&breakdown, config.preferences.units)
                    );
                }
            }
        }

        Commands::Config { show, init } => {
            let path = cli
                .config
                .clone()
                .unwrap_or_else(AppConfig::default_config_path);

            if init {
                if path.exists() {
                    println!(
                        "{} {}",
                        "Config already exists:".yellow(),
                        path.display()
                    );
                } else {
                    let mut fresh = AppConfig::default();
                    fresh
                        .save_to_file(&path)
                        .with_context(|| format!("Failed to initialize {}", path.display()))?;
                    println!("{} {}", "✓ Wrote".green(), path.display());
                }
            }

            if show || !init {
                println!("{}", format!("# {}", path.display()).dimmed());
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}
