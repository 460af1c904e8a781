//! Derive the dimension and fact tables from cleaned rows.
//!
//! Each dimension is deduplicated on its defining attribute tuple (which
//! includes the restaurant identity) and given a sequential id in
//! first-seen row order. The fact table keeps one row per cleaned row and
//! resolves its foreign keys by left-joining back to each dimension on the
//! shared restaurant identity.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use serde_json::json;

use crate::models::{
    AttributesDim, DietaryDim, LocationDim, PriceRangeDim, RestaurantDim, RestaurantReviewsFact,
    RestaurantRow, StarSchema,
};

/// Build the six derived tables from cleaned rows.
pub fn build_star_schema(rows: &[RestaurantRow]) -> StarSchema {
    let restaurant_dim = rows.iter().map(restaurant_entry).collect();

    let (location_dim, location_ids) = dedup_dim(
        rows,
        |r| json!([r.restaurant_id, &r.address, r.longitude, r.latitude]).to_string(),
        |id, r| LocationDim {
            location_id: id,
            restaurant_id: r.restaurant_id,
            address: r.address.clone(),
            longitude: r.longitude,
            latitude: r.latitude,
        },
    );

    let (price_range_dim, price_range_ids) = dedup_dim(
        rows,
        |r| json!([r.restaurant_id, r.eur_price_range_from, r.eur_price_range_to]).to_string(),
        |id, r| PriceRangeDim {
            price_range_id: id,
            restaurant_id: r.restaurant_id,
            eur_price_range_from: r.eur_price_range_from,
            eur_price_range_to: r.eur_price_range_to,
        },
    );

    let (attributes_dim, attributes_ids) = dedup_dim(
        rows,
        |r| json!([r.restaurant_id, &r.meals, &r.cuisines, &r.features]).to_string(),
        |id, r| AttributesDim {
            attributes_id: id,
            restaurant_id: r.restaurant_id,
            meals: r.meals.clone(),
            cuisines: r.cuisines.clone(),
            features: r.features.clone(),
        },
    );

    let (dietary_dim, dietary_ids) = dedup_dim(
        rows,
        |r| {
            json!([r.restaurant_id, r.vegetarian_friendly, r.vegan_options, r.gluten_free])
                .to_string()
        },
        |id, r| DietaryDim {
            dietary_id: id,
            restaurant_id: r.restaurant_id,
            vegetarian_friendly: r.vegetarian_friendly,
            vegan_options: r.vegan_options,
            gluten_free: r.gluten_free,
        },
    );

    let mut restaurant_reviews_fact: Vec<RestaurantReviewsFact> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| RestaurantReviewsFact {
            review_id: idx as u32 + 1,
            restaurant_id: row.restaurant_id,
            location_id: location_ids.get(&row.restaurant_id).copied(),
            price_range_id: price_range_ids.get(&row.restaurant_id).copied(),
            attributes_id: attributes_ids.get(&row.restaurant_id).copied(),
            dietary_id: dietary_ids.get(&row.restaurant_id).copied(),
            avg_rating: row.avg_rating,
            total_reviews_count: row.total_reviews_count,
            popularity_rnk_all_restaurants: row.popularity_rnk_all_restaurants,
            food: row.food,
            service: row.service,
            value: row.value,
            atmosphere: row.atmosphere,
        })
        .collect();

    dedup_fact_rows(&mut restaurant_reviews_fact);

    StarSchema {
        restaurant_dim,
        location_dim,
        price_range_dim,
        attributes_dim,
        dietary_dim,
        restaurant_reviews_fact,
    }
}

fn restaurant_entry(row: &RestaurantRow) -> RestaurantDim {
    RestaurantDim {
        restaurant_id: row.restaurant_id,
        restaurant_name: row.restaurant_name.clone(),
        claimed: row.claimed,
        awards: row.awards.clone(),
        tripadvisor_link: row.tripadvisor_link.clone(),
        keywords: row.keywords.clone(),
        open_days_per_week: row.open_days_per_week,
        open_hours_per_week: row.open_hours_per_week,
        original_open_hours: row.original_open_hours.clone(),
    }
}

/// Deduplicate rows on a key, assigning sequential ids in first-seen
/// order. Returns the dimension entries and the restaurant-to-dimension
/// id mapping used for the fact-table join (first match wins).
fn dedup_dim<T>(
    rows: &[RestaurantRow],
    key: impl Fn(&RestaurantRow) -> String,
    build: impl Fn(u32, &RestaurantRow) -> T,
) -> (Vec<T>, HashMap<u32, u32>) {
    let mut entries = Vec::new();
    let mut ids_by_key: HashMap<String, u32> = HashMap::new();
    let mut ids_by_restaurant: HashMap<u32, u32> = HashMap::new();

    for row in rows {
        let id = match ids_by_key.entry(key(row)) {
            Entry::Occupied(slot) => *slot.get(),
            Entry::Vacant(slot) => {
                let id = entries.len() as u32 + 1;
                entries.push(build(id, row));
                *slot.insert(id)
            }
        };
        ids_by_restaurant.entry(row.restaurant_id).or_insert(id);
    }

    (entries, ids_by_restaurant)
}

/// Remove exact full-row duplicates from the fact table.
fn dedup_fact_rows(fact: &mut Vec<RestaurantReviewsFact>) {
    let mut seen = HashSet::new();
    fact.retain(|entry| {
        seen.insert(
            json!([
                entry.review_id,
                entry.restaurant_id,
                entry.location_id,
                entry.price_range_id,
                entry.attributes_id,
                entry.dietary_id,
                entry.avg_rating,
                entry.total_reviews_count,
                entry.popularity_rnk_all_restaurants,
                entry.food,
                entry.service,
                entry.value,
                entry.atmosphere,
            ])
            .to_string(),
        )
    });
}
