//! devicestore CLI
//!
//! Command-line administration of a device collection file.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use devicestore::persist::RestoreOutcome;
use devicestore::{CollectionStore, Config};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

/// devicestore CLI
#[derive(Parser, Debug)]
#[command(name = "devicestore-cli")]
#[command(about = "Inspect and edit a durable device collection file")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./devices")]
    data_dir: String,

    /// Collection file name inside the data directory
    #[arg(short, long, default_value = "devices.json")]
    file: String,

    /// Attribution written to modifiedBy
    #[arg(short, long, default_value = "script")]
    modified_by: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the collection file if it does not exist
    Init,

    /// Print all records
    List,

    /// Print one record by asset number
    Get {
        /// The asset number
        asset_number: String,
    },

    /// Insert or update a record from a JSON object
    Upsert {
        /// The record as JSON
        json: String,
    },

    /// Patch an existing record with a JSON object
    Update {
        /// The asset number
        asset_number: String,

        /// Fields to overwrite, as JSON
        json: String,
    },

    /// Delete all records with an asset number
    Delete {
        /// The asset number
        asset_number: String,
    },

    /// Restore the collection from its backup
    Restore,

    /// Report the state of the collection, backup and temp files
    Check,
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,devicestore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("devicestore v{}", devicestore::VERSION);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .file_name(&args.file)
        .modified_by(&args.modified_by)
        .build();

    let store = match CollectionStore::open(config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&store, args.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Execute one command; `Ok(false)` means the operation was not applied
fn run(store: &CollectionStore, command: Commands) -> devicestore::Result<bool> {
    match command {
        Commands::Init => {
            tracing::info!("Collection ready at {}", store.path().display());
            Ok(true)
        }
        Commands::List => print_json(&store.list()?),
        Commands::Get { asset_number } => match store.get(&asset_number)? {
            Some(record) => print_json(&record),
            None => {
                tracing::warn!("No device with asset number {}", asset_number);
                Ok(false)
            }
        },
        Commands::Upsert { json } => {
            let outcome = store.upsert_value(parse_json(&json)?)?;
            print_json(&outcome)?;
            Ok(outcome.success)
        }
        Commands::Update { asset_number, json } => {
            let patch = devicestore::DeviceRecord::from_value(parse_json(&json)?)?;
            let outcome = store.update(&asset_number, patch.into_map())?;
            print_json(&outcome)?;
            Ok(outcome.is_success())
        }
        Commands::Delete { asset_number } => {
            let outcome = store.delete(&asset_number)?;
            print_json(&outcome)?;
            Ok(outcome.is_success())
        }
        Commands::Restore => match store.restore()? {
            RestoreOutcome::Restored(records) => {
                tracing::info!("Restored {} records", records.len());
                print_json(&records)
            }
            RestoreOutcome::Unrecoverable => Ok(false),
        },
        Commands::Check => {
            let report = store.check()?;
            print_json(&report)?;
            Ok(report.is_healthy())
        }
    }
}

fn parse_json(text: &str) -> devicestore::Result<Value> {
    Ok(serde_json::from_str(text)?)
}

fn print_json<T: Serialize>(value: &T) -> devicestore::Result<bool> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(true)
}
