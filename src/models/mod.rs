//! Domain models for the restostar transformation.
//!
//! This module contains the statically-typed records for every table in the
//! pipeline:
//!
//! - [`RawRestaurantRecord`] - the flat input contract, one row per listing
//! - [`RestaurantRow`] - the cleaned, canonically-ordered working row
//! - [`RestaurantDim`], [`LocationDim`], [`PriceRangeDim`],
//!   [`AttributesDim`], [`DietaryDim`] - the dimension tables
//! - [`RestaurantReviewsFact`] - the fact table linking them
//! - [`StarSchema`] - the six derived tables as one value
//!
//! Field declaration order is the column order of each table; serialization
//! preserves it, so the canonical layout survives into the JSON output.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// =============================================================================
// Input Schema Contract
// =============================================================================

/// Input columns the transformation consumes. Ingestion fails with a
/// schema-mismatch error when any of these is absent.
pub const REQUIRED_COLUMNS: [&str; 25] = [
    "restaurant_link",
    "restaurant_name",
    "address",
    "latitude",
    "longitude",
    "claimed",
    "awards",
    "popularity_generic",
    "price_range",
    "meals",
    "cuisines",
    "features",
    "vegetarian_friendly",
    "vegan_options",
    "gluten_free",
    "original_open_hours",
    "open_days_per_week",
    "open_hours_per_week",
    "avg_rating",
    "total_reviews_count",
    "food",
    "service",
    "value",
    "atmosphere",
    "keywords",
];

/// Input columns discarded on ingest, redundant or low-value for the star
/// schema. They may be absent without error.
pub const DROPPED_COLUMNS: [&str; 17] = [
    "original_location",
    "country",
    "region",
    "province",
    "city",
    "top_tags",
    "price_level",
    "special_diets",
    "default_language",
    "popularity_detailed",
    "working_shifts_per_week",
    "reviews_count_in_default_language",
    "excellent",
    "very_good",
    "average",
    "poor",
    "terrible",
];

// =============================================================================
// Raw Input Record
// =============================================================================

/// One row of the flat restaurant listing export, untyped strings and
/// review aggregates as they arrive. Every field is optional; empty CSV
/// cells deserialize to `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRestaurantRecord {
    pub restaurant_link: Option<String>,
    pub restaurant_name: Option<String>,
    pub original_location: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub claimed: Option<String>,
    pub awards: Option<String>,
    pub popularity_detailed: Option<String>,
    pub popularity_generic: Option<String>,
    pub top_tags: Option<String>,
    pub price_level: Option<String>,
    pub price_range: Option<String>,
    pub meals: Option<String>,
    pub cuisines: Option<String>,
    pub special_diets: Option<String>,
    pub features: Option<String>,
    pub vegetarian_friendly: Option<String>,
    pub vegan_options: Option<String>,
    pub gluten_free: Option<String>,
    pub original_open_hours: Option<String>,
    pub open_days_per_week: Option<f64>,
    pub open_hours_per_week: Option<f64>,
    pub working_shifts_per_week: Option<f64>,
    pub avg_rating: Option<f64>,
    pub total_reviews_count: Option<f64>,
    pub default_language: Option<String>,
    pub reviews_count_in_default_language: Option<f64>,
    pub excellent: Option<f64>,
    pub very_good: Option<f64>,
    pub average: Option<f64>,
    pub poor: Option<f64>,
    pub terrible: Option<f64>,
    pub food: Option<f64>,
    pub service: Option<f64>,
    pub value: Option<f64>,
    pub atmosphere: Option<f64>,
    pub keywords: Option<String>,
}

impl RawRestaurantRecord {
    /// Equality key over the columns that survive ingest. Two records with
    /// the same key are exact full-row duplicates for deduplication
    /// purposes; the dropped columns do not participate.
    pub(crate) fn dedup_key(&self) -> String {
        json!([
            &self.restaurant_link,
            &self.restaurant_name,
            &self.address,
            self.latitude,
            self.longitude,
            &self.claimed,
            &self.awards,
            &self.popularity_generic,
            &self.price_range,
            &self.meals,
            &self.cuisines,
            &self.features,
            &self.vegetarian_friendly,
            &self.vegan_options,
            &self.gluten_free,
            &self.original_open_hours,
            self.open_days_per_week,
            self.open_hours_per_week,
            self.avg_rating,
            self.total_reviews_count,
            self.food,
            self.service,
            self.value,
            self.atmosphere,
            &self.keywords,
        ])
        .to_string()
    }
}

// =============================================================================
// Cleaned Working Row
// =============================================================================

/// A fully cleaned restaurant row. Field order is the canonical column
/// layout of the cleaned table.
///
/// Coordinates use `0.0` as the sentinel for missing values; every other
/// absent value stays `None` (lists are never coerced to empty vectors).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantRow {
    pub restaurant_id: u32,
    pub restaurant_name: Option<String>,
    pub address: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    pub claimed: bool,
    pub avg_rating: Option<f64>,
    pub total_reviews_count: Option<i64>,
    pub popularity_rnk_all_restaurants: Option<i64>,
    pub awards: Option<Vec<String>>,
    pub eur_price_range_from: Option<i64>,
    pub eur_price_range_to: Option<i64>,
    pub meals: Option<Vec<String>>,
    pub cuisines: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub vegetarian_friendly: Option<bool>,
    pub vegan_options: Option<bool>,
    pub gluten_free: Option<bool>,
    pub open_days_per_week: Option<i64>,
    pub open_hours_per_week: Option<i64>,
    pub original_open_hours: Option<String>,
    pub food: Option<f64>,
    pub service: Option<f64>,
    pub value: Option<f64>,
    pub atmosphere: Option<f64>,
    pub tripadvisor_link: Option<String>,
    pub keywords: Option<Vec<String>>,
}

// =============================================================================
// Dimension Tables
// =============================================================================

/// Identity plus descriptive/administrative attributes, one row per
/// restaurant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantDim {
    pub restaurant_id: u32,
    pub restaurant_name: Option<String>,
    pub claimed: bool,
    pub awards: Option<Vec<String>>,
    pub tripadvisor_link: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub open_days_per_week: Option<i64>,
    pub open_hours_per_week: Option<i64>,
    pub original_open_hours: Option<String>,
}

/// Unique (restaurant, address, coordinates) combinations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationDim {
    pub location_id: u32,
    pub restaurant_id: u32,
    pub address: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
}

/// Unique (restaurant, price bounds) combinations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRangeDim {
    pub price_range_id: u32,
    pub restaurant_id: u32,
    pub eur_price_range_from: Option<i64>,
    pub eur_price_range_to: Option<i64>,
}

/// Unique (restaurant, meals, cuisines, features) combinations, compared
/// by exact list content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributesDim {
    pub attributes_id: u32,
    pub restaurant_id: u32,
    pub meals: Option<Vec<String>>,
    pub cuisines: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
}

/// Unique (restaurant, dietary flags) combinations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DietaryDim {
    pub dietary_id: u32,
    pub restaurant_id: u32,
    pub vegetarian_friendly: Option<bool>,
    pub vegan_options: Option<bool>,
    pub gluten_free: Option<bool>,
}

// =============================================================================
// Fact Table
// =============================================================================

/// One row per restaurant, carrying the numeric review measures and
/// foreign keys into the five dimensions. Keys are optional to preserve
/// left-join semantics: an unmatched key stays null instead of dropping
/// the row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantReviewsFact {
    pub review_id: u32,
    pub restaurant_id: u32,
    pub location_id: Option<u32>,
    pub price_range_id: Option<u32>,
    pub attributes_id: Option<u32>,
    pub dietary_id: Option<u32>,
    pub avg_rating: Option<f64>,
    pub total_reviews_count: Option<i64>,
    pub popularity_rnk_all_restaurants: Option<i64>,
    pub food: Option<f64>,
    pub service: Option<f64>,
    pub value: Option<f64>,
    pub atmosphere: Option<f64>,
}

// =============================================================================
// Star Schema
// =============================================================================

/// The six derived tables produced by one transformation run. Held only in
/// memory and handed back to the caller; never mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct StarSchema {
    pub restaurant_dim: Vec<RestaurantDim>,
    pub location_dim: Vec<LocationDim>,
    pub price_range_dim: Vec<PriceRangeDim>,
    pub attributes_dim: Vec<AttributesDim>,
    pub dietary_dim: Vec<DietaryDim>,
    pub restaurant_reviews_fact: Vec<RestaurantReviewsFact>,
}

impl StarSchema {
    /// The output contract: a mapping with exactly six fixed table names,
    /// each value a column-oriented table (column name to row-index to
    /// value, row indices as decimal strings from `"0"`).
    pub fn to_tables(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let mut tables = Map::new();
        tables.insert("restaurant_dim".into(), to_columnar(&self.restaurant_dim)?);
        tables.insert("location_dim".into(), to_columnar(&self.location_dim)?);
        tables.insert("price_range_dim".into(), to_columnar(&self.price_range_dim)?);
        tables.insert("attributes_dim".into(), to_columnar(&self.attributes_dim)?);
        tables.insert("dietary_dim".into(), to_columnar(&self.dietary_dim)?);
        tables.insert(
            "restaurant_reviews_fact".into(),
            to_columnar(&self.restaurant_reviews_fact)?,
        );
        Ok(tables)
    }

    /// Same as [`StarSchema::to_tables`], wrapped as a single JSON value.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        self.to_tables().map(Value::Object)
    }
}

/// Pivot row-oriented records into the column-oriented table shape.
pub fn to_columnar<T: Serialize>(rows: &[T]) -> Result<Value, serde_json::Error> {
    let mut columns: Map<String, Value> = Map::new();
    for (idx, row) in rows.iter().enumerate() {
        if let Value::Object(fields) = serde_json::to_value(row)? {
            for (name, value) in fields {
                let column = columns
                    .entry(name)
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(cells) = column {
                    cells.insert(idx.to_string(), value);
                }
            }
        }
    }
    Ok(Value::Object(columns))
}

// =============================================================================
// Tests
// =============================================================================
