//! restostar CLI - transform flat restaurant listings into a star schema.
//!
//! # Commands
//!
//! ```bash
//! restostar transform listings.csv -o tables.json   # full transformation
//! restostar check listings.csv                      # transform + integrity report
//! restostar parse listings.csv                      # just parse CSV to typed JSON
//! restostar columns                                 # show the input schema contract
//! ```

use clap::{Parser, Subcommand};
use restostar::transform::pipeline::printable_delimiter;
use restostar::{
    parse_bytes_auto, parse_bytes_with_delimiter, transform_csv, verify_star_schema, StarSchema,
    TransformOptions, DROPPED_COLUMNS, REQUIRED_COLUMNS,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "restostar")]
#[command(about = "Transform flat restaurant listings into a star schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV file and output the raw typed records as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Full transformation: CSV in, six star-schema tables as JSON out
    Transform {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,

        /// Skip the post-derivation integrity checks
        #[arg(long)]
        no_checks: bool,
    },

    /// Transform and report integrity-check results and table counts
    Check {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Show the expected input columns
    Columns,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::Transform {
            input,
            delimiter,
            output,
            pretty,
            no_checks,
        } => cmd_transform(&input, delimiter, output.as_deref(), pretty, no_checks),

        Commands::Check { input, delimiter } => cmd_check(&input, delimiter),

        Commands::Columns => cmd_columns(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Parsing CSV: {}", input.display());

    let bytes = fs::read(input)?;
    let result = match delimiter {
        Some(d) => parse_bytes_with_delimiter(&bytes, d)?,
        None => parse_bytes_auto(&bytes)?,
    };

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        printable_delimiter(result.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("   Parsed {} records", result.records.len());

    let json = serde_json::to_string_pretty(&result.records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_transform(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
    pretty: bool,
    no_checks: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Processing: {}", input.display());

    let options = TransformOptions {
        delimiter,
        skip_checks: no_checks,
    };
    let report = transform_csv(input, &options)?;

    eprintln!("   Encoding: {}", report.csv_info.encoding);
    eprintln!(
        "   Delimiter: '{}'",
        printable_delimiter(report.csv_info.delimiter)
    );
    eprintln!("   Rows: {}", report.csv_info.row_count);
    print_counts(&report.schema);

    let tables = report.schema.to_json()?;
    let json = if pretty {
        serde_json::to_string_pretty(&tables)?
    } else {
        serde_json::to_string(&tables)?
    };
    write_output(&json, output)?;

    Ok(())
}

fn cmd_check(input: &Path, delimiter: Option<char>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Checking: {}", input.display());

    // run the checks by hand below so every violation gets printed
    let options = TransformOptions {
        delimiter,
        skip_checks: true,
    };
    let report = transform_csv(input, &options)?;
    print_counts(&report.schema);

    match verify_star_schema(&report.schema) {
        Ok(()) => {
            eprintln!("   All integrity checks passed");
            Ok(())
        }
        Err(problems) => {
            for problem in &problems {
                eprintln!("   {problem}");
            }
            Err(format!("{} integrity check(s) failed", problems.len()).into())
        }
    }
}

fn cmd_columns() -> Result<(), Box<dyn std::error::Error>> {
    println!("Required input columns:");
    for column in REQUIRED_COLUMNS {
        println!("  {column}");
    }
    println!();
    println!("Dropped on ingest (may be absent):");
    for column in DROPPED_COLUMNS {
        println!("  {column}");
    }
    Ok(())
}

fn print_counts(schema: &StarSchema) {
    eprintln!("   restaurant_dim: {} rows", schema.restaurant_dim.len());
    eprintln!("   location_dim: {} rows", schema.location_dim.len());
    eprintln!("   price_range_dim: {} rows", schema.price_range_dim.len());
    eprintln!("   attributes_dim: {} rows", schema.attributes_dim.len());
    eprintln!("   dietary_dim: {} rows", schema.dietary_dim.len());
    eprintln!(
        "   restaurant_reviews_fact: {} rows",
        schema.restaurant_reviews_fact.len()
    );
}

fn write_output(json: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
