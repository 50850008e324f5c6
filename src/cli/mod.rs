use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::{BatchFilter, LedgerService};

/// Stockroom - Sock Warehouse Stock Ledger
#[derive(Parser)]
#[command(name = "stockroom")]
#[command(about = "A local-first sock warehouse stock ledger for the command line")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "stockroom.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Record incoming stock for a (color, cotton part) batch
    Income {
        /// Sock color (e.g. "red")
        color: String,

        /// Cotton percentage, 0-100
        cotton_part: i64,

        /// Number of pairs received
        quantity: i64,
    },

    /// Release stock from an existing batch
    Outcome {
        /// Sock color
        color: String,

        /// Cotton percentage, 0-100
        cotton_part: i64,

        /// Number of pairs released
        quantity: i64,
    },

    /// List batches with optional filters
    Batches {
        /// Filter by exact color
        #[arg(long)]
        color: Option<String>,

        /// Minimum cotton percentage (inclusive)
        #[arg(long)]
        min_cotton: Option<i64>,

        /// Maximum cotton percentage (inclusive)
        #[arg(long)]
        max_cotton: Option<i64>,

        /// Sort order: color, cottonPart
        #[arg(short, long)]
        sort_by: Option<String>,
    },

    /// Overwrite a batch's color, cotton part and quantity by id
    Update {
        /// Batch id
        id: i64,

        /// New color
        color: String,

        /// New cotton percentage, 0-100
        cotton_part: i64,

        /// New quantity
        quantity: i64,
    },

    /// Import batches from CSV (one `color,cotton_part,quantity` record per line)
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Export batches to CSV or JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        init_tracing(self.verbose);

        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Income {
                color,
                cotton_part,
                quantity,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                service
                    .register_income(&color, cotton_part, quantity)
                    .await?;
                println!(
                    "Recorded income: {} pairs of {} ({}% cotton)",
                    quantity, color, cotton_part
                );
            }

            Commands::Outcome {
                color,
                cotton_part,
                quantity,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                service
                    .register_outcome(&color, cotton_part, quantity)
                    .await?;
                println!(
                    "Recorded outcome: {} pairs of {} ({}% cotton)",
                    quantity, color, cotton_part
                );
            }

            Commands::Batches {
                color,
                min_cotton,
                max_cotton,
                sort_by,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let batches = service
                    .list_batches(BatchFilter {
                        color,
                        min_cotton,
                        max_cotton,
                        sort_by,
                    })
                    .await?;

                if batches.is_empty() {
                    println!("No batches found.");
                } else {
                    println!(
                        "{:<6} {:<16} {:>10} {:>10}",
                        "ID", "COLOR", "COTTON %", "QUANTITY"
                    );
                    println!("{}", "-".repeat(46));
                    for batch in batches {
                        println!(
                            "{:<6} {:<16} {:>10} {:>10}",
                            batch.id, batch.color, batch.cotton_part, batch.quantity
                        );
                    }
                }
            }

            Commands::Update {
                id,
                color,
                cotton_part,
                quantity,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let batch = service
                    .update_batch(id, &color, cotton_part, quantity)
                    .await?;
                println!(
                    "Updated batch {}: {} ({}% cotton), quantity {}",
                    batch.id, batch.color, batch.cotton_part, batch.quantity
                );
            }

            Commands::Import { input } => {
                let service = LedgerService::connect(&self.database).await?;
                run_import_command(&service, input.as_deref()).await?;
            }

            Commands::Export { output, format } => {
                let service = LedgerService::connect(&self.database).await?;
                run_export_command(&service, output.as_deref(), &format).await?;
            }
        }

        Ok(())
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("stockroom=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stockroom=warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_import_command(service: &LedgerService, input: Option<&str>) -> Result<()> {
    use std::fs::File;
    use std::io::{Read, stdin};

    // Determine input reader
    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let imported = service.import_batches(reader).await?;
    println!("Import complete: {} batches", imported);

    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    output: Option<&str>,
    format: &str,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match format {
        "csv" => {
            exporter
                .export_batches_csv(writer, BatchFilter::default())
                .await?
        }
        "json" => {
            exporter
                .export_batches_json(writer, BatchFilter::default())
                .await?
        }
        _ => {
            anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", format);
        }
    };

    if output.is_some() {
        println!("Exported {} batches", count);
    }

    Ok(())
}
