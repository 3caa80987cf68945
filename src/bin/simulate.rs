//! Essence conversion simulator CLI.
//!
//! Run Monte Carlo simulations of lesser-to-greater essence conversion and
//! export one CSV row per session.
//!
//! Usage:
//!   cargo run --release --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --release --bin simulate                         # 100000 sessions x 1000 units
//!   cargo run --release --bin simulate -- -n 1000 -u 200       # smaller run
//!   cargo run --release --bin simulate -- --seed 42 --json     # reproducible, with JSON summary
//!   cargo run --release --bin simulate -- --protected Haste    # only keep Haste

use clap::Parser;
use essence::core::constants::{
    DEFAULT_CONVERSION_PROB, DEFAULT_EXALTED_PRICE, DEFAULT_NUM_SESSIONS, DEFAULT_NUM_UNITS,
    DEFAULT_OUTPUT_PATH,
};
use essence::essence::{EssenceTables, EssenceType, SessionConfig};
use essence::simulator::{run_simulation, write_csv, SimConfig, SimReport};
use essence::SimResult;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(name = "simulate", version, about = "Essence conversion Monte Carlo simulator")]
struct Cli {
    /// Number of independent sessions
    #[arg(short = 'n', long, default_value_t = DEFAULT_NUM_SESSIONS)]
    sessions: u32,

    /// Batches of three lesser essences bought per session
    #[arg(short = 'u', long, default_value_t = DEFAULT_NUM_UNITS)]
    units: u32,

    /// Lesser essences per exalted orb
    #[arg(long, default_value_t = DEFAULT_EXALTED_PRICE)]
    exalted_price: f64,

    /// Chance that a conversion yields a greater essence
    #[arg(long, default_value_t = DEFAULT_CONVERSION_PROB)]
    conversion_prob: f64,

    /// Essence type holding the initial stock
    #[arg(long, default_value = "Torment")]
    starting_type: EssenceType,

    /// Essence types kept instead of converted (comma separated)
    #[arg(long, value_delimiter = ',', default_value = "Haste,Electricity")]
    protected: Vec<EssenceType>,

    /// Convert every type, keep nothing
    #[arg(long, conflicts_with = "protected")]
    no_protected: bool,

    /// JSON file overriding the price and weight tables
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Worker threads (default: one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Per-session CSV output path
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Also save the summary report as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn to_config(&self) -> SimResult<SimConfig> {
        let tables = match &self.tables {
            Some(path) => EssenceTables::load(path)?,
            None => EssenceTables::default(),
        };
        let protected_types = if self.no_protected {
            Vec::new()
        } else {
            self.protected.clone()
        };

        Ok(SimConfig {
            num_sessions: self.sessions,
            session: SessionConfig {
                num_units: self.units,
                exalted_price: self.exalted_price,
                conversion_probability: self.conversion_prob,
                starting_type: self.starting_type,
                protected_types,
                tables,
            },
            seed: self.seed,
            threads: self.threads,
            output_path: self.output.clone(),
        })
    }
}

fn init_logging(cli: &Cli) {
    let log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .with_thread_ids(cli.verbose >= 2)
        .with_writer(std::io::stderr)
        .init();

    debug!("simulate started with verbosity level: {}", cli.verbose);
}

fn print_banner(config: &SimConfig) {
    let session = &config.session;
    let protected = if session.protected_types.is_empty() {
        "none".to_string()
    } else {
        session
            .protected_types
            .iter()
            .map(|essence| essence.name())
            .collect::<Vec<_>>()
            .join(", ")
    };

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              ESSENCE CONVERSION SIMULATOR                     ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Sessions:        {}", config.num_sessions);
    println!("  Units/Session:   {}", session.num_units);
    println!("  Exalted Price:   {}", session.exalted_price);
    println!("  Conversion Prob: {}", session.conversion_probability);
    println!("  Starting Type:   {}", session.starting_type);
    println!("  Protected:       {}", protected);
    if let Some(seed) = config.seed {
        println!("  Seed:            {}", seed);
    }
    println!();
}

fn run(cli: &Cli) -> SimResult<()> {
    let config = cli.to_config()?;
    print_banner(&config);

    let outcomes = run_simulation(&config)?;

    write_csv(&config.output_path, &outcomes)?;
    info!(path = %config.output_path.display(), rows = outcomes.len(), "results written");

    let report = SimReport::from_outcomes(&outcomes);
    println!("{}", report.to_text());

    if cli.json {
        let filename = format!(
            "sim_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        std::fs::write(&filename, report.to_json()?)?;
        println!("JSON report saved to: {}", filename);
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["simulate"]);
        let config = cli.to_config().unwrap();
        assert_eq!(config.num_sessions, 100_000);
        assert_eq!(config.session, SessionConfig::default());
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "simulate",
            "-n",
            "50",
            "-u",
            "10",
            "--starting-type",
            "ice",
            "--protected",
            "Haste,Mind",
            "--conversion-prob",
            "0.5",
            "--seed",
            "3",
        ]);
        let config = cli.to_config().unwrap();
        assert_eq!(config.num_sessions, 50);
        assert_eq!(config.session.num_units, 10);
        assert_eq!(config.session.starting_type, EssenceType::Ice);
        assert_eq!(
            config.session.protected_types,
            vec![EssenceType::Haste, EssenceType::Mind]
        );
        assert_eq!(config.session.conversion_probability, 0.5);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn test_no_protected() {
        let cli = Cli::parse_from(["simulate", "--no-protected"]);
        assert!(cli.to_config().unwrap().session.protected_types.is_empty());
    }

    #[test]
    fn test_unknown_starting_type_rejected() {
        assert!(Cli::try_parse_from(["simulate", "--starting-type", "Greed"]).is_err());
    }
}
