//! Referential-integrity checks for the derived star schema.
//!
//! The transformation derives every dimension from the fact rows
//! themselves, so these invariants hold by construction; the checks exist
//! to catch regressions, not bad data:
//!
//! - all identities are sequential from 1 in row order;
//! - no dimension outgrows the restaurant dimension;
//! - every fact foreign key is non-null and resolves to exactly one
//!   dimension row whose restaurant linkage matches the fact row.
//!
//! All violations are collected and returned together rather than stopping
//! at the first.

use std::collections::{HashMap, HashSet};

use crate::models::StarSchema;

/// Verify the schema's integrity invariants. Returns every violation
/// found, or `Ok(())` when the schema is sound.
pub fn verify_star_schema(schema: &StarSchema) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();
    let restaurants = schema.restaurant_dim.len();

    check_sequential(
        "restaurant_dim.restaurant_id",
        schema.restaurant_dim.iter().map(|r| r.restaurant_id),
        &mut problems,
    );
    check_sequential(
        "location_dim.location_id",
        schema.location_dim.iter().map(|l| l.location_id),
        &mut problems,
    );
    check_sequential(
        "price_range_dim.price_range_id",
        schema.price_range_dim.iter().map(|p| p.price_range_id),
        &mut problems,
    );
    check_sequential(
        "attributes_dim.attributes_id",
        schema.attributes_dim.iter().map(|a| a.attributes_id),
        &mut problems,
    );
    check_sequential(
        "dietary_dim.dietary_id",
        schema.dietary_dim.iter().map(|d| d.dietary_id),
        &mut problems,
    );
    check_sequential(
        "restaurant_reviews_fact.review_id",
        schema.restaurant_reviews_fact.iter().map(|f| f.review_id),
        &mut problems,
    );

    for (name, len) in [
        ("location_dim", schema.location_dim.len()),
        ("price_range_dim", schema.price_range_dim.len()),
        ("attributes_dim", schema.attributes_dim.len()),
        ("dietary_dim", schema.dietary_dim.len()),
    ] {
        if len > restaurants {
            problems.push(format!(
                "{name} has {len} rows but restaurant_dim has {restaurants}"
            ));
        }
    }

    let restaurant_ids: HashSet<u32> = schema
        .restaurant_dim
        .iter()
        .map(|r| r.restaurant_id)
        .collect();
    let locations: HashMap<u32, u32> = schema
        .location_dim
        .iter()
        .map(|l| (l.location_id, l.restaurant_id))
        .collect();
    let price_ranges: HashMap<u32, u32> = schema
        .price_range_dim
        .iter()
        .map(|p| (p.price_range_id, p.restaurant_id))
        .collect();
    let attributes: HashMap<u32, u32> = schema
        .attributes_dim
        .iter()
        .map(|a| (a.attributes_id, a.restaurant_id))
        .collect();
    let dietary: HashMap<u32, u32> = schema
        .dietary_dim
        .iter()
        .map(|d| (d.dietary_id, d.restaurant_id))
        .collect();

    for fact in &schema.restaurant_reviews_fact {
        if !restaurant_ids.contains(&fact.restaurant_id) {
            problems.push(format!(
                "review {}: restaurant_id {} not present in restaurant_dim",
                fact.review_id, fact.restaurant_id
            ));
        }
        check_fk(fact.review_id, fact.restaurant_id, "location_id", fact.location_id, &locations, &mut problems);
        check_fk(fact.review_id, fact.restaurant_id, "price_range_id", fact.price_range_id, &price_ranges, &mut problems);
        check_fk(fact.review_id, fact.restaurant_id, "attributes_id", fact.attributes_id, &attributes, &mut problems);
        check_fk(fact.review_id, fact.restaurant_id, "dietary_id", fact.dietary_id, &dietary, &mut problems);
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

/// Ids must run 1, 2, 3, ... in row order. Reports the first divergence
/// only; one broken sequence would otherwise flood the report.
fn check_sequential(label: &str, ids: impl Iterator<Item = u32>, problems: &mut Vec<String>) {
    for (idx, id) in ids.enumerate() {
        let expected = idx as u32 + 1;
        if id != expected {
            problems.push(format!(
                "{label}: expected {expected} at position {idx}, found {id}"
            ));
            break;
        }
    }
}

fn check_fk(
    review_id: u32,
    restaurant_id: u32,
    column: &str,
    fk: Option<u32>,
    dim: &HashMap<u32, u32>,
    problems: &mut Vec<String>,
) {
    match fk {
        None => problems.push(format!("review {review_id}: {column} is null")),
        Some(id) => match dim.get(&id) {
            None => problems.push(format!(
                "review {review_id}: {column} {id} does not resolve"
            )),
            Some(linked) if *linked != restaurant_id => problems.push(format!(
                "review {review_id}: {column} {id} belongs to restaurant {linked}, not {restaurant_id}"
            )),
            Some(_) => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRestaurantRecord;
    use crate::transform::clean::clean_records;
    use crate::transform::star::build_star_schema;

    fn sample_schema() -> StarSchema {
        let records = ["Chez Paul", "Osteria", "Taverna"]
            .iter()
            .map(|name| RawRestaurantRecord {
                restaurant_name: Some(name.to_string()),
                vegetarian_friendly: Some("Y".into()),
                ..Default::default()
            })
            .collect();
        build_star_schema(&clean_records(records).unwrap())
    }

    #[test]
    fn test_derived_schema_is_sound() {
        assert!(verify_star_schema(&sample_schema()).is_ok());
    }

    #[test]
    fn test_broken_fk_reported() {
        let mut schema = sample_schema();
        schema.restaurant_reviews_fact[0].dietary_id = Some(99);

        let problems = verify_star_schema(&schema).unwrap_err();
        assert!(problems.iter().any(|p| p.contains("dietary_id 99")));
    }

    #[test]
    fn test_null_fk_reported() {
        let mut schema = sample_schema();
        schema.restaurant_reviews_fact[1].location_id = None;

        let problems = verify_star_schema(&schema).unwrap_err();
        assert!(problems.iter().any(|p| p.contains("location_id is null")));
    }

    #[test]
    fn test_mismatched_linkage_reported() {
        let mut schema = sample_schema();
        // points at a real location row, but one derived from a different
        // restaurant
        schema.restaurant_reviews_fact[0].location_id = Some(2);

        let problems = verify_star_schema(&schema).unwrap_err();
        assert!(problems.iter().any(|p| p.contains("belongs to restaurant")));
    }

    #[test]
    fn test_non_sequential_ids_reported() {
        let mut schema = sample_schema();
        schema.location_dim[2].location_id = 7;

        let problems = verify_star_schema(&schema).unwrap_err();
        assert!(problems.iter().any(|p| p.contains("location_dim.location_id")));
    }
}
