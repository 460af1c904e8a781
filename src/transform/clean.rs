//! Column cleaning and type coercion.
//!
//! Turns raw listing records into canonical [`RestaurantRow`]s: full-row
//! deduplication, a stable sort by restaurant name, sentinel coordinates,
//! street-level addresses, recoded flags, comma-separated fields split
//! into ordered lists, and the rank/price extractions. Identities are
//! assigned from 1 in post-sort order.
//!
//! Missing values stay missing throughout; the only coercion that can fail
//! is a non-null value that does not match its extraction pattern.

use std::cmp::Ordering;
use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{TransformError, TransformResult};
use crate::models::{RawRestaurantRecord, RestaurantRow};

static RANK_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\d+)").expect("rank pattern"));

static PRICE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"€([\d,]+)-€([\d,]+)").expect("price pattern"));

/// Clean a batch of raw records into canonical rows.
///
/// Order matters: duplicates are removed over the surviving raw columns
/// first, rows are then stably sorted by name (missing names last), and
/// `restaurant_id` reflects the final position, starting at 1.
pub fn clean_records(records: Vec<RawRestaurantRecord>) -> TransformResult<Vec<RestaurantRow>> {
    let mut seen = HashSet::new();
    let mut rows: Vec<RawRestaurantRecord> = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert(record.dedup_key()) {
            rows.push(record);
        }
    }

    rows.sort_by(|a, b| compare_names(a.restaurant_name.as_deref(), b.restaurant_name.as_deref()));

    rows.into_iter()
        .enumerate()
        .map(|(idx, record)| clean_row(idx + 1, record))
        .collect()
}

/// Clean one record; `position` is its 1-based post-sort row number and
/// becomes its `restaurant_id`.
fn clean_row(position: usize, record: RawRestaurantRecord) -> TransformResult<RestaurantRow> {
    let (eur_price_range_from, eur_price_range_to) =
        extract_price_range(position, record.price_range.as_deref())?;

    Ok(RestaurantRow {
        restaurant_id: position as u32,
        restaurant_name: record.restaurant_name,
        address: record.address.as_deref().map(street_portion),
        longitude: record.longitude.unwrap_or(0.0),
        latitude: record.latitude.unwrap_or(0.0),
        claimed: record.claimed.as_deref() == Some("Claimed"),
        avg_rating: record.avg_rating,
        total_reviews_count: record.total_reviews_count.map(|v| v as i64),
        popularity_rnk_all_restaurants: extract_rank(
            position,
            record.popularity_generic.as_deref(),
        )?,
        awards: record.awards.as_deref().map(split_list),
        eur_price_range_from,
        eur_price_range_to,
        meals: record.meals.as_deref().map(split_list),
        cuisines: record.cuisines.as_deref().map(split_list),
        features: record.features.as_deref().map(split_list),
        vegetarian_friendly: yes_no(record.vegetarian_friendly.as_deref()),
        vegan_options: yes_no(record.vegan_options.as_deref()),
        gluten_free: yes_no(record.gluten_free.as_deref()),
        open_days_per_week: record.open_days_per_week.map(|v| v as i64),
        open_hours_per_week: record.open_hours_per_week.map(|v| v as i64),
        original_open_hours: record.original_open_hours,
        food: record.food,
        service: record.service,
        value: record.value,
        atmosphere: record.atmosphere,
        tripadvisor_link: record.restaurant_link,
        keywords: record.keywords.as_deref().map(split_list),
    })
}

/// Ascending by name, missing names last, equal names keep prior order
/// (the caller uses a stable sort).
fn compare_names(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Keep only the part before the first comma, discarding city/region
/// suffix text.
fn street_portion(address: &str) -> String {
    address.split(',').next().unwrap_or(address).to_string()
}

/// Split a comma-separated field into an ordered list of trimmed strings.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|item| item.trim().to_string()).collect()
}

/// `"Y"`/`"N"` to boolean; anything else (including null) is null.
fn yes_no(raw: Option<&str>) -> Option<bool> {
    match raw {
        Some("Y") => Some(true),
        Some("N") => Some(false),
        _ => None,
    }
}

/// Extract the rank from a formatted popularity string such as
/// `"#12 of 350 places to eat"`. Null stays null; non-null text without a
/// rank is a value-format error.
fn extract_rank(row: usize, raw: Option<&str>) -> TransformResult<Option<i64>> {
    let Some(text) = raw else {
        return Ok(None);
    };
    let captures = RANK_PATTERN.captures(text).ok_or_else(|| {
        value_format(row, "popularity_generic", text, "expected a rank like \"#12 of 350\"")
    })?;
    let rank = captures[1].parse::<i64>().map_err(|_| {
        value_format(row, "popularity_generic", text, "rank does not fit in an integer")
    })?;
    Ok(Some(rank))
}

/// Extract both bounds from a currency-formatted range such as
/// `"€1,200-€3,000"`, stripping thousands separators. Null stays null for
/// both bounds.
fn extract_price_range(
    row: usize,
    raw: Option<&str>,
) -> TransformResult<(Option<i64>, Option<i64>)> {
    let Some(text) = raw else {
        return Ok((None, None));
    };
    let captures = PRICE_PATTERN.captures(text).ok_or_else(|| {
        value_format(row, "price_range", text, "expected a range like \"€10-€20\"")
    })?;
    let from = parse_amount(&captures[1])
        .map_err(|_| value_format(row, "price_range", text, "lower bound does not fit in an integer"))?;
    let to = parse_amount(&captures[2])
        .map_err(|_| value_format(row, "price_range", text, "upper bound does not fit in an integer"))?;
    Ok((Some(from), Some(to)))
}

fn parse_amount(digits: &str) -> Result<i64, std::num::ParseIntError> {
    digits.replace(',', "").parse()
}

fn value_format(row: usize, column: &str, value: &str, message: &str) -> TransformError {
    TransformError::ValueFormat {
        row,
        column: column.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str) -> RawRestaurantRecord {
        RawRestaurantRecord {
            restaurant_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicates_removed_before_id_assignment() {
        let records = vec![raw("Chez Paul"), raw("Chez Paul"), raw("Osteria")];
        let rows = clean_records(records).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].restaurant_id, 1);
        assert_eq!(rows[1].restaurant_id, 2);
    }

    #[test]
    fn test_sorted_by_name_missing_last() {
        let records = vec![
            raw("Osteria"),
            RawRestaurantRecord::default(),
            raw("Bistro"),
        ];
        let rows = clean_records(records).unwrap();

        assert_eq!(rows[0].restaurant_name.as_deref(), Some("Bistro"));
        assert_eq!(rows[1].restaurant_name.as_deref(), Some("Osteria"));
        assert!(rows[2].restaurant_name.is_none());
    }

    #[test]
    fn test_missing_coordinates_become_sentinel_zero() {
        let mut record = raw("Chez Paul");
        record.latitude = Some(48.85);
        let rows = clean_records(vec![record]).unwrap();

        assert_eq!(rows[0].latitude, 48.85);
        assert_eq!(rows[0].longitude, 0.0);
    }

    #[test]
    fn test_address_truncated_at_first_comma() {
        let mut record = raw("Chez Paul");
        record.address = Some("12 Main St, Springfield, IL".into());
        let rows = clean_records(vec![record]).unwrap();

        assert_eq!(rows[0].address.as_deref(), Some("12 Main St"));
    }

    #[test]
    fn test_claimed_recode() {
        let mut claimed = raw("A");
        claimed.claimed = Some("Claimed".into());
        let mut unclaimed = raw("B");
        unclaimed.claimed = Some("Not Claimed".into());
        let missing = raw("C");

        let rows = clean_records(vec![claimed, unclaimed, missing]).unwrap();
        assert!(rows[0].claimed);
        assert!(!rows[1].claimed);
        assert!(!rows[2].claimed);
    }

    #[test]
    fn test_list_fields_split_and_trimmed() {
        let mut record = raw("Chez Paul");
        record.awards = Some("Award A, Award B".into());
        record.cuisines = Some(" French ,Italian".into());
        let rows = clean_records(vec![record]).unwrap();

        assert_eq!(
            rows[0].awards.as_deref(),
            Some(&["Award A".to_string(), "Award B".to_string()][..])
        );
        assert_eq!(
            rows[0].cuisines.as_deref(),
            Some(&["French".to_string(), "Italian".to_string()][..])
        );
        assert!(rows[0].meals.is_none());
    }

    #[test]
    fn test_rank_extraction() {
        let mut record = raw("Chez Paul");
        record.popularity_generic = Some("#12 of 350 places to eat in Springfield".into());
        let rows = clean_records(vec![record]).unwrap();
        assert_eq!(rows[0].popularity_rnk_all_restaurants, Some(12));

        let rows = clean_records(vec![raw("Chez Paul")]).unwrap();
        assert_eq!(rows[0].popularity_rnk_all_restaurants, None);
    }

    #[test]
    fn test_unparseable_rank_is_value_format_error() {
        let mut record = raw("Chez Paul");
        record.popularity_generic = Some("unranked".into());
        let err = clean_records(vec![record]).unwrap_err();

        assert!(matches!(err, TransformError::ValueFormat { .. }));
        assert!(err.to_string().contains("popularity_generic"));
    }

    #[test]
    fn test_price_range_extraction() {
        let mut record = raw("Chez Paul");
        record.price_range = Some("€10-€20".into());
        let rows = clean_records(vec![record]).unwrap();
        assert_eq!(rows[0].eur_price_range_from, Some(10));
        assert_eq!(rows[0].eur_price_range_to, Some(20));

        let rows = clean_records(vec![raw("Chez Paul")]).unwrap();
        assert_eq!(rows[0].eur_price_range_from, None);
        assert_eq!(rows[0].eur_price_range_to, None);
    }

    #[test]
    fn test_price_range_thousands_separators() {
        let mut record = raw("Chez Paul");
        record.price_range = Some("€1,200-€3,000".into());
        let rows = clean_records(vec![record]).unwrap();
        assert_eq!(rows[0].eur_price_range_from, Some(1200));
        assert_eq!(rows[0].eur_price_range_to, Some(3000));
    }

    #[test]
    fn test_malformed_price_range_is_value_format_error() {
        let mut record = raw("Chez Paul");
        record.price_range = Some("$10-$20".into());
        let err = clean_records(vec![record]).unwrap_err();
        assert!(err.to_string().contains("price_range"));
    }

    #[test]
    fn test_counts_coerced_preserving_missing() {
        let mut record = raw("Chez Paul");
        record.total_reviews_count = Some(127.0);
        record.open_days_per_week = Some(7.0);
        let rows = clean_records(vec![record]).unwrap();

        assert_eq!(rows[0].total_reviews_count, Some(127));
        assert_eq!(rows[0].open_days_per_week, Some(7));
        assert_eq!(rows[0].open_hours_per_week, None);
    }

    #[test]
    fn test_yes_no_recode_unknown_becomes_null() {
        let mut record = raw("Chez Paul");
        record.vegetarian_friendly = Some("Y".into());
        record.vegan_options = Some("N".into());
        record.gluten_free = Some("maybe".into());
        let rows = clean_records(vec![record]).unwrap();

        assert_eq!(rows[0].vegetarian_friendly, Some(true));
        assert_eq!(rows[0].vegan_options, Some(false));
        assert_eq!(rows[0].gluten_free, None);
    }

    #[test]
    fn test_link_renamed() {
        let mut record = raw("Chez Paul");
        record.restaurant_link = Some("g1234".into());
        let rows = clean_records(vec![record]).unwrap();
        assert_eq!(rows[0].tripadvisor_link.as_deref(), Some("g1234"));
    }

    #[test]
    fn test_stable_sort_preserves_prior_order_on_ties() {
        let mut first = raw("Bistro");
        first.address = Some("1 First St".into());
        let mut second = raw("Bistro");
        second.address = Some("2 Second St".into());

        let rows = clean_records(vec![first, second]).unwrap();
        assert_eq!(rows[0].address.as_deref(), Some("1 First St"));
        assert_eq!(rows[1].address.as_deref(), Some("2 Second St"));
    }
}
