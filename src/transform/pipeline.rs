//! High-level pipeline API.
//!
//! This module provides the entry points that combine all steps: parsing,
//! header validation, cleaning, and star-schema derivation.
//!
//! # Example
//!
//! ```rust,ignore
//! use restostar::{transform_csv, TransformOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = transform_csv(Path::new("listings.csv"), &TransformOptions::default())?;
//!     println!("{} restaurants", report.schema.restaurant_dim.len());
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::models::{RawRestaurantRecord, StarSchema};
use crate::parser::{self, ParseResult};
use crate::transform::clean::clean_records;
use crate::transform::star::build_star_schema;
use crate::validation::verify_star_schema;

/// Options for the transformation pipeline.
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// Explicit delimiter; auto-detected when `None`.
    pub delimiter: Option<char>,

    /// Skip the post-derivation integrity checks.
    pub skip_checks: bool,
}

/// CSV ingestion metadata.
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Result of a complete transformation run over a CSV input.
#[derive(Debug, Clone)]
pub struct TransformReport {
    /// The six derived tables.
    pub schema: StarSchema,

    /// CSV ingestion metadata.
    pub csv_info: CsvInfo,
}

/// Transform an in-memory table of raw records into the star schema.
///
/// This is the core contract: one tabular input, six derived tables out.
/// Schema drift is impossible on this path (the record type is the
/// schema); value-format failures and empty input are the only errors.
pub fn transform_records(records: Vec<RawRestaurantRecord>) -> PipelineResult<StarSchema> {
    if records.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let total = records.len();
    let rows = clean_records(records)?;
    if rows.len() < total {
        info!("removed {} duplicate row(s)", total - rows.len());
    }

    let schema = build_star_schema(&rows);
    info!(
        restaurants = schema.restaurant_dim.len(),
        locations = schema.location_dim.len(),
        price_ranges = schema.price_range_dim.len(),
        attributes = schema.attributes_dim.len(),
        dietary = schema.dietary_dim.len(),
        reviews = schema.restaurant_reviews_fact.len(),
        "derived star schema"
    );
    Ok(schema)
}

/// Transform a CSV file.
///
/// Parses with auto-detection (or the explicit delimiter from `options`),
/// validates the header contract, then runs [`transform_records`].
pub fn transform_csv(path: &Path, options: &TransformOptions) -> PipelineResult<TransformReport> {
    let bytes = std::fs::read(path)?;
    transform_bytes(&bytes, options)
}

/// Same as [`transform_csv`] but accepts raw bytes instead of a file path.
pub fn transform_bytes(bytes: &[u8], options: &TransformOptions) -> PipelineResult<TransformReport> {
    let parsed = match options.delimiter {
        Some(delimiter) => parser::parse_bytes_with_delimiter(bytes, delimiter)?,
        None => parser::parse_bytes_auto(bytes)?,
    };
    let ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    } = parsed;
    info!(
        %encoding,
        delimiter = %printable_delimiter(delimiter),
        rows = records.len(),
        "parsed input"
    );

    parser::validate_headers(&headers)?;

    let csv_info = CsvInfo {
        encoding,
        delimiter,
        row_count: records.len(),
        headers,
    };

    let schema = transform_records(records)?;

    if !options.skip_checks {
        if let Err(problems) = verify_star_schema(&schema) {
            for problem in &problems {
                warn!("integrity: {problem}");
            }
            return Err(PipelineError::Integrity(problems));
        }
    }

    Ok(TransformReport { schema, csv_info })
}

/// Format a delimiter for display.
pub fn printable_delimiter(delimiter: char) -> String {
    match delimiter {
        '\t' => "\\t".to_string(),
        other => other.to_string(),
    }
}
