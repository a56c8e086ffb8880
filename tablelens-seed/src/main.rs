//! Tablelens seed CLI
//!
//! Seeds `public.customers_demo`, prints the seed as SQL, or verifies a
//! seeded database.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::process;
use tablelens::connection::{connect, redact_connection_string};
use tablelens::seed::{check_seeded, run_seed, RunMode, SeedPlan};
use tablelens::{AppConfig, PgExecutor};

#[derive(Parser)]
#[command(name = "tablelens-seed")]
#[command(about = "Seed and verify the customers_demo demonstration table")]
#[command(version = "0.1.0")]
struct Cli {
    /// Database connection URL (defaults to DATABASE_URL / config/config.toml)
    #[arg(long)]
    database_url: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Drop, recreate and populate the table (default)
    Run {
        /// Wrap all statements in one transaction
        #[arg(long)]
        atomic: bool,
    },

    /// Print the seed as a SQL script
    Print,

    /// Check row count, NULLs, the duplicate pair and the composite index
    Verify,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let plan = SeedPlan::customers_demo()?;

    match cli.command.unwrap_or(Commands::Run { atomic: false }) {
        Commands::Print => {
            print!("{}", plan.render_script());
        }
        Commands::Run { atomic } => {
            let executor = open_executor(cli.database_url)?;
            let mode = if atomic { RunMode::Transaction } else { RunMode::Autocommit };
            let report = run_seed(&executor, &plan, mode)?;
            if !cli.quiet {
                println!("{}", report.summary());
            }
        }
        Commands::Verify => {
            let executor = open_executor(cli.database_url)?;
            let found = check_seeded(&executor)?;
            if !cli.quiet {
                println!(
                    "✅ {} rows, {} duplicate group(s), index over {} columns",
                    found.total_rows,
                    found.duplicate_groups.len(),
                    found.index_columns.len()
                );
            }
        }
    }

    Ok(())
}

fn open_executor(flag: Option<String>) -> anyhow::Result<PgExecutor> {
    let database_url = resolve_database_url(flag)?;
    log::info!("connecting to {}", redact_connection_string(&database_url));
    let client = connect(&database_url).context("Error connecting to database")?;
    Ok(PgExecutor::new(client))
}

fn resolve_database_url(flag: Option<String>) -> anyhow::Result<String> {
    if let Some(url) = flag.filter(|u| !u.is_empty()) {
        return Ok(url);
    }
    let config = AppConfig::load()?;
    Ok(config.database_url()?.to_string())
}
