//! # restostar - restaurant listings to star schema
//!
//! restostar reshapes a flat table of restaurant listings (one row per
//! restaurant, ~40 loosely-typed columns) into a small star schema: five
//! dimension tables plus one fact table, ready for analytical querying.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Transform  │────▶│ Star schema │
//! │  (ISO/UTF8) │     │ (auto-enc)  │     │ (clean+star)│     │  (6 tables) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! The transformation itself is a plain synchronous function over an
//! in-memory table: no I/O, no concurrency, no partial output. The CSV
//! boundary exists for the CLI and for callers that start from files.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use restostar::{transform_csv, TransformOptions};
//! use std::path::Path;
//!
//! let report = transform_csv(Path::new("listings.csv"), &TransformOptions::default())?;
//! println!("{} restaurants", report.schema.restaurant_dim.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - hierarchical error types
//! - [`models`] - typed records per table, plus the columnar output shape
//! - [`parser`] - CSV ingestion with encoding/delimiter auto-detection
//! - [`transform`] - cleaning, star derivation, and the pipeline
//! - [`validation`] - referential-integrity checks on the result

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CsvError, CsvResult, PipelineError, PipelineResult, TransformError, TransformResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    to_columnar, AttributesDim, DietaryDim, LocationDim, PriceRangeDim, RawRestaurantRecord,
    RestaurantDim, RestaurantReviewsFact, RestaurantRow, StarSchema, DROPPED_COLUMNS,
    REQUIRED_COLUMNS,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    detect_delimiter, detect_encoding, parse_bytes_auto, parse_bytes_with_delimiter,
    parse_csv_file_auto, validate_headers, ParseResult,
};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::clean::clean_records;
pub use transform::pipeline::{
    transform_bytes, transform_csv, transform_records, CsvInfo, TransformOptions, TransformReport,
};
pub use transform::star::build_star_schema;

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::verify_star_schema;
