//! Turns one raw .osm element into the record written to the JSON output.
//!
//! Sample record for a tagged node:
//!
//! ```json
//! {
//!     "type": "node",
//!     "id": "613579685",
//!     "pos": [45.4822582, 9.1802182],
//!     "created": {"changeset": "12881709", "timestamp": "2012-08-27T16:40:40Z",
//!                 "uid": "113669", "user": "AnyFile", "version": "3"},
//!     "name": "The Hub",
//!     "address": {"housenumber": "8", "postcode": "20154", "street": "Via Paolo Sarpi"},
//!     "fixme": ["Is this really a tourism attraction? A better tag should be found."],
//!     "amenity": {"type": "general_attraction"}
//! }
//! ```

pub mod amenity;
pub mod attributes;
pub mod postcode;
pub mod street;
pub mod tags;

use crate::data::{osm::RawElement, record::NormalizedRecord};
use crate::errors::Result;

use self::{attributes::extract_attributes, tags::extract_tags};

/// Normalizes a single element. Fails only on a malformed coordinate, in
/// which case nothing of the element is kept.
pub fn normalize(element: &RawElement) -> Result<NormalizedRecord> {
    let attributes = extract_attributes(&element.attributes)?;
    let tags = extract_tags(&element.tags);

    let mut record = NormalizedRecord {
        element_type: element.element_type,
        pos: attributes.pos,
        created: attributes.created,
        name: tags.name,
        address: tags.address,
        fixme: tags.fixme,
        amenity: tags.amenity,
        node_refs: element.node_refs.clone(),
        member_refs: element.member_refs.clone(),
        passthrough: attributes.passthrough,
    };
    // Structured fields overwrite same-named attributes.
    let shadowed: Vec<String> = record
        .passthrough
        .keys()
        .filter(|key| record.has_field(key.as_str()))
        .cloned()
        .collect();
    for key in shadowed {
        record.passthrough.remove(&key);
    }
    Ok(record)
}
