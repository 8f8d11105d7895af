use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cleaning::Stage;
use crate::config::Config;
use crate::db::connection::{init_db, Database};
use crate::errors::Result;

mod cleaning;
mod config;
mod db;
mod domain;
mod errors;
mod logging;
mod spreadsheets;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(name = "housing-cleaner")]
#[command(about = "Cleans a housing sales export held in a SQLite table")]
#[command(version)]
struct Cli {
    /// SQLite file holding the sales table
    #[arg(long, global = true, default_value = "housing.sqlite3")]
    db: PathBuf,

    /// TOML config file (defaults to ./housing_cleaner.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load raw rows from a .csv or .xlsx export into the sales table
    Import {
        input: PathBuf,
        /// Delete existing rows before loading
        #[arg(long)]
        replace: bool,
    },
    /// Run the cleaning pipeline, or only the given stages
    Clean {
        #[arg(long = "stage", value_enum)]
        stages: Vec<Stage>,
    },
    /// List rows that repeat an earlier transaction
    Duplicates {
        #[arg(long)]
        json: bool,
    },
    /// Check the table against the cleaning invariants
    Audit {
        #[arg(long)]
        json: bool,
    },
    /// Write the table to an .xlsx or .csv file
    Export { output: PathBuf },
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let mut db = Database::open(&cli.db, &config.cleaning)?;
    init_db(&mut db)?;

    match cli.command {
        Commands::Import { input, replace } => {
            let summary = db::import_file(&mut db, &input, &config.import, replace)?;
            println!(
                "Imported {} rows ({} skipped) from {}",
                summary.inserted,
                summary.skipped,
                input.display()
            );
            if !summary.ignored_headers.is_empty() {
                println!("Ignored columns: {}", summary.ignored_headers.join(", "));
            }
        }
        Commands::Clean { stages } => {
            let reports = cleaning::run_pipeline(&mut db, &config.cleaning, &stages)?;
            for report in &reports {
                println!("{:<16} {} rows", report.stage, report.rows_affected);
            }
        }
        Commands::Duplicates { json } => {
            let duplicates = cleaning::duplicates::find_duplicate_transactions(db.conn())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&duplicates)?);
            } else {
                let groups = cleaning::dedup::duplicate_groups(db.conn())?;
                for g in &groups {
                    println!(
                        "Group of {} sharing parcel {} (keeps UniqueID {})",
                        g.size,
                        g.parcel_id.as_deref().unwrap_or("-"),
                        g.canonical_unique_id,
                    );
                }
                for d in &duplicates {
                    println!(
                        "UniqueID {:>8}  rank {}  parcel {}  {}",
                        d.unique_id,
                        d.rank,
                        d.parcel_id.as_deref().unwrap_or("-"),
                        d.legal_reference.as_deref().unwrap_or("-"),
                    );
                }
                println!("{} duplicate transactions", duplicates.len());
            }
        }
        Commands::Audit { json } => {
            let audit = cleaning::audit::audit(db.conn())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&audit)?);
            } else {
                println!("{audit}");
            }
        }
        Commands::Export { output } => {
            let rows = spreadsheets::export(db.conn(), &output)?;
            println!("Exported {rows} rows to {}", output.display());
        }
    }

    Ok(())
}

fn main() {
    logging::init_logging();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
