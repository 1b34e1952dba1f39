//! Reconciles the overlapping `amenity`, `shop` and `tourism` tags into one
//! classification.

use crate::data::record::AmenityClassification;

/// Known `tourism` values and the category each one is filed under.
pub const TOURISM_CATEGORIES: [(&str, &str); 17] = [
    ("aquarium", "aquarium"),
    ("artwork", "general_attraction"),
    ("attraction", "general_attraction"),
    ("botanical garden", "park"),
    ("camp_site", "park"),
    ("gallery", "museum"),
    ("guest_house", "hotel"),
    ("hostel", "hotel"),
    ("hotel", "hotel"),
    ("information", "tourist_information"),
    ("motel", "hotel"),
    ("museum", "museum"),
    ("picnic_site", "park"),
    ("residence", "hotel"),
    ("theme_park", "theme_park"),
    ("viewpoint", "general_attraction"),
    ("zoo", "zoo"),
];

/// Amenity values that are really shops.
const AMENITY_SHOPS: [&str; 3] = ["insurance", "massage", "ice_cream"];

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn tourism_category(tourism: &str) -> Option<&'static str> {
    TOURISM_CATEGORIES
        .iter()
        .find(|(value, _)| *value == tourism)
        .map(|(_, category)| *category)
}

/// Covers `parking`, `parking_space`, `parking_entrance`...
fn is_parking(amenity: &str) -> bool {
    amenity.starts_with("parking")
}

/// Classifies an element from its raw tag values.
///
/// A recognised `tourism` value always wins, then any `shop`, then `amenity`.
/// Empty strings count as missing. Returns `None` when nothing is left to classify.
pub fn classify(
    amenity: Option<&str>,
    shop: Option<&str>,
    tourism: Option<&str>,
) -> Option<AmenityClassification> {
    if let Some(category) = tourism.and_then(tourism_category) {
        return Some(AmenityClassification::of_type(category));
    }
    if let Some(shop) = present(shop) {
        return Some(AmenityClassification::shop(shop));
    }
    let amenity = present(amenity)?;
    if AMENITY_SHOPS.contains(&amenity) {
        Some(AmenityClassification::shop(amenity))
    } else if is_parking(amenity) {
        Some(AmenityClassification::of_type("parking"))
    } else {
        Some(AmenityClassification::of_type(amenity))
    }
}
