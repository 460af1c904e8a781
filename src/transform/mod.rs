//! Transformation stages: column cleaning, star-schema derivation, and the
//! high-level pipeline that ties them to the CSV boundary.

pub mod clean;
pub mod pipeline;
pub mod star;

pub use clean::clean_records;
pub use pipeline::{transform_bytes, transform_csv, transform_records};
pub use star::build_star_schema;
