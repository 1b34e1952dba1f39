use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::data::{osm::Tag, record::AmenityClassification};

use super::{amenity::classify, postcode::is_valid_postcode, street::fix_street};

/// Keys whose values are free-text notes about problems with the element.
pub const FIXME: [&str; 3] = ["FIXME", "fixme", "fixme:2"];

static ADDRESS_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^addr:([a-z]+|_+)").expect("static regex"));

#[derive(Debug, Default, PartialEq)]
pub struct ElementTags {
    pub name: Option<String>,
    pub address: BTreeMap<String, String>,
    pub fixme: Vec<String>,
    pub amenity: Option<AmenityClassification>,
}

#[derive(Default)]
struct AmenityInputs<'a> {
    amenity: Option<&'a str>,
    shop: Option<&'a str>,
    tourism: Option<&'a str>,
}

/// Cleans an `addr:<component>` value. `None` drops the component.
fn address_value(component: &str, value: &str) -> Option<String> {
    match component {
        "street" => Some(fix_street(value)),
        "postcode" if !is_valid_postcode(value) => None,
        _ => Some(value.to_string()),
    }
}

/// Buckets an element's tags. Keys other than addresses, fixme notes, the
/// amenity family and `name` are dropped. Repeated keys keep the last value.
pub fn extract_tags(tags: &[Tag]) -> ElementTags {
    let mut extracted = ElementTags::default();
    let mut inputs = AmenityInputs::default();

    for tag in tags {
        let value = tag.value.as_str();
        if let Some(captures) = ADDRESS_KEY.captures(&tag.key) {
            let component = &captures[1];
            if let Some(value) = address_value(component, value) {
                extracted.address.insert(component.to_string(), value);
            }
            continue;
        }
        match tag.key.as_str() {
            key if FIXME.contains(&key) => extracted.fixme.push(value.to_string()),
            "amenity" => inputs.amenity = Some(value),
            "shop" => inputs.shop = Some(value),
            "tourism" => inputs.tourism = Some(value),
            "name" => extracted.name = Some(value.to_string()),
            _ => (),
        }
    }

    extracted.amenity = classify(inputs.amenity, inputs.shop, inputs.tourism);
    extracted
}
