//! Error types for the restostar transformation pipeline.
//!
//! This module defines a small hierarchy of error types:
//!
//! - [`CsvError`] - CSV ingestion errors
//! - [`TransformError`] - schema and value-format errors during cleaning
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries. All errors are fatal:
//! the pipeline never produces partial or recovered output.

use thiserror::Error;

// =============================================================================
// CSV Ingestion Errors
// =============================================================================

/// Errors during CSV ingestion.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read input.
    #[error("Failed to read input: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid CSV format.
    #[error("Invalid CSV format: {0}")]
    ParseError(#[from] csv::Error),

    /// Empty input.
    #[error("CSV input is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors during column cleaning and type coercion.
///
/// Two classes exist: a referenced input column is absent (schema
/// mismatch), or a non-null value fails a pattern extraction that has no
/// defined missing-value handling (value format).
#[derive(Debug, Error)]
pub enum TransformError {
    /// Missing required input column.
    #[error("Missing input column: {0}")]
    MissingColumn(String),

    /// A non-null value failed a pattern extraction or coercion.
    #[error("Row {row}, column '{column}' (value '{value}'): {message}")]
    ValueFormat {
        row: usize,
        column: String,
        value: String,
        message: String,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by
/// [`crate::transform::pipeline::transform_csv`]. It wraps all lower-level
/// errors and adds pipeline-specific variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV ingestion error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Cleaning or schema error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No records to transform.
    #[error("No records to transform")]
    EmptyInput,

    /// The derived schema violated its referential-integrity invariants.
    #[error("Star schema failed {} integrity check(s)", .0.len())]
    Integrity(Vec<String>),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV ingestion.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for cleaning operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
