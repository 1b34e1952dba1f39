use std::collections::BTreeMap;

use serde::Serialize;

use super::osm::ElementType;

/// Canonical amenity category. `goods` is only ever set for shops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmenityClassification {
    #[serde(rename = "type")]
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    goods: Option<String>,
}

impl AmenityClassification {
    pub fn of_type(kind: &str) -> Self {
        AmenityClassification {
            kind: kind.to_string(),
            goods: None,
        }
    }

    pub fn shop(goods: &str) -> Self {
        AmenityClassification {
            kind: "shop".to_string(),
            goods: Some(goods.to_string()),
        }
    }
}

/// One cleansed element, shaped for the document store.
///
/// Empty collections and unset options are left out of the JSON entirely.
/// Any attribute without a dedicated field (`id` among them) lands in
/// `passthrough` and is written as a top-level key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    #[serde(rename = "type")]
    pub element_type: ElementType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub created: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub address: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fixme: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenity: Option<AmenityClassification>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub node_refs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub member_refs: Vec<String>,
    #[serde(flatten)]
    pub passthrough: BTreeMap<String, String>,
}

impl NormalizedRecord {
    /// Whether a structured field called `key` will be written.
    pub fn has_field(&self, key: &str) -> bool {
        match key {
            "type" => true,
            "pos" => self.pos.is_some(),
            "created" => !self.created.is_empty(),
            "name" => self.name.is_some(),
            "address" => !self.address.is_empty(),
            "fixme" => !self.fixme.is_empty(),
            "amenity" => self.amenity.is_some(),
            "node_refs" => !self.node_refs.is_empty(),
            "member_refs" => !self.member_refs.is_empty(),
            _ => false,
        }
    }
}
