use serde::Serialize;

/// The three kinds of map element kept from the .osm file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Node,
    Way,
    Relation,
}

impl ElementType {
    pub fn from_tag_name(name: &[u8]) -> Option<Self> {
        match name {
            b"node" => Some(ElementType::Node),
            b"way" => Some(ElementType::Way),
            b"relation" => Some(ElementType::Relation),
            _ => None,
        }
    }
}

/// A `<tag k=".." v=".."/>` child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Tag {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One element as read from the XML, before any cleansing. Attributes keep
/// document order; `node_refs` and `member_refs` hold the `ref` of each `nd`
/// and `member` child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    pub element_type: ElementType,
    pub attributes: Vec<(String, String)>,
    pub tags: Vec<Tag>,
    pub node_refs: Vec<String>,
    pub member_refs: Vec<String>,
}

impl RawElement {
    pub fn new(element_type: ElementType) -> Self {
        RawElement {
            element_type,
            attributes: Vec::new(),
            tags: Vec::new(),
            node_refs: Vec::new(),
            member_refs: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}
