use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str;

use log::{info, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tqdm::tqdm;
use xz::bufread::XzDecoder;

use crate::UserConfig;
use crate::data::osm::{ElementType, RawElement, Tag};
use crate::data::record::NormalizedRecord;
use crate::errors::Result;
use crate::normalize::normalize;

use super::Etl;

pub const ETL_NAME: &str = "osm_json";

/// Reads a .osm extract and writes one cleansed JSON record per node, way and relation.
pub struct OsmJsonEtl<'a> {
    config: &'a UserConfig,
}

fn attribute_value(el: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        if attribute.key.as_ref() == key {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn required_attribute(el: &BytesStart, key: &[u8]) -> Result<String> {
    match attribute_value(el, key)? {
        Some(value) => Ok(value),
        None => Err(format!(
            "<{}> element without '{}' attribute",
            String::from_utf8_lossy(el.name().as_ref()),
            String::from_utf8_lossy(key),
        ).into()),
    }
}

fn parse_element(element_type: ElementType, el: &BytesStart) -> Result<RawElement> {
    let mut element = RawElement::new(element_type);
    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        let key = str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn parse_child(element: &mut RawElement, el: &BytesStart) -> Result<()> {
    match el.name().as_ref() {
        b"tag" => element.tags.push(Tag::new(
            required_attribute(el, b"k")?,
            required_attribute(el, b"v")?,
        )),
        b"nd" => element.node_refs.push(required_attribute(el, b"ref")?),
        b"member" => element.member_refs.push(required_attribute(el, b"ref")?),
        _ => (),
    }
    Ok(())
}

/// Collects every node, way and relation in document order, together with
/// their `tag`, `nd` and `member` children. Anything else is skipped.
pub fn read_elements<R: BufRead>(reader: &mut Reader<R>) -> Result<Vec<RawElement>> {
    let mut buf = Vec::new();
    let mut elements: Vec<RawElement> = Vec::new();
    let mut current: Option<RawElement> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => {
                if let Some(element_type) = ElementType::from_tag_name(e.name().as_ref()) {
                    current = Some(parse_element(element_type, &e)?);
                } else if let Some(element) = current.as_mut() {
                    parse_child(element, &e)?;
                }
            },
            Event::Empty(e) => {
                if let Some(element_type) = ElementType::from_tag_name(e.name().as_ref()) {
                    elements.push(parse_element(element_type, &e)?);
                } else if let Some(element) = current.as_mut() {
                    parse_child(element, &e)?;
                }
            },
            Event::End(e) => {
                if ElementType::from_tag_name(e.name().as_ref()).is_some() {
                    if let Some(element) = current.take() {
                        elements.push(element);
                    }
                }
            },
            // Declarations, comments and the text of <note> carry nothing we keep.
            _ => (),
        }
        // if we don't keep a borrow elsewhere, we can clear the buffer to keep memory usage low
        buf.clear();
    }
    Ok(elements)
}

impl OsmJsonEtl<'_> {
    fn create_osm_reader(&self) -> Result<Reader<Box<dyn BufRead>>> {
        let path = Path::new(&self.config.data_path);
        let file_reader = BufReader::new(fs::File::open(path)?);
        let input: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "xz") {
            Box::new(BufReader::new(XzDecoder::new(file_reader)))
        } else {
            Box::new(file_reader)
        };
        let mut reader = Reader::from_reader(input);
        reader.trim_text(true);

        Ok(reader)
    }

    pub fn new(config: &UserConfig) -> OsmJsonEtl {
        OsmJsonEtl {
            config
        }
    }
}

impl Etl for OsmJsonEtl<'_> {
    type Input = Vec<RawElement>;
    type Output = Vec<NormalizedRecord>;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn output_file_name(&self) -> String {
        format!("{}.json", self.config.output_name)
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        let mut reader = self.create_osm_reader()?;
        let elements = read_elements(&mut reader)?;
        info!(etl_name = ETL_NAME, elements = elements.len(); "Read elements");
        Ok(elements)
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let mut records = Vec::with_capacity(input.len());
        let mut skipped: usize = 0;

        for element in tqdm(input.iter()) {
            match normalize(element) {
                Ok(record) => records.push(record),
                Err(err) if self.config.skip_malformed => {
                    warn!(
                        etl_name = ETL_NAME,
                        id = element.attribute("id").unwrap_or("-"),
                        err = err.message.as_str();
                        "Skipping malformed element"
                    );
                    skipped += 1;
                },
                Err(err) => return Err(err),
            }
        }
        info!(etl_name = ETL_NAME, records = records.len(), skipped = skipped; "Normalized elements");
        Ok(records)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        let mut writer = BufWriter::new(fs::File::create(self.output_path(dir))?);
        for record in &output {
            if self.config.pretty {
                serde_json::to_writer_pretty(&mut writer, record)?;
            } else {
                serde_json::to_writer(&mut writer, record)?;
            }
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use tempfile::tempdir;

    use super::*;

    const OSM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="Overpass API">
  <note>The data included in this document is from www.openstreetmap.org.</note>
  <bounds minlat="45.4" minlon="9.1" maxlat="45.5" maxlon="9.2"/>
  <node id="613579685" lat="45.4822582" lon="9.1802182" version="3" changeset="12881709" user="AnyFile" uid="113669" timestamp="2012-08-27T16:40:40Z">
    <tag k="tourism" v="attraction"/>
    <tag k="name" v="The Hub"/>
    <tag k="addr:street" v="via Paolo Sarpi"/>
    <tag k="addr:housenumber" v="8"/>
    <tag k="addr:postcode" v="20154"/>
    <tag k="fixme" v="Is this really a tourism attraction? A better tag should be found."/>
  </node>
  <node id="2" lat="45.48" lon="9.18"/>
  <way id="10" version="1">
    <nd ref="1"/>
    <nd ref="2"/>
    <nd ref="3"/>
    <tag k="shop" v="bakery"/>
    <tag k="name" v="Panificio &amp; Co"/>
  </way>
  <relation id="20">
    <member type="way" ref="10" role="outer"/>
    <member type="node" ref="2" role=""/>
    <tag k="type" v="multipolygon"/>
  </relation>
</osm>
"#;

    fn config(data_path: &Path, skip_malformed: bool) -> UserConfig {
        UserConfig {
            data_path: data_path.to_string_lossy().into_owned(),
            output_name: "milan".to_string(),
            pretty: false,
            skip_malformed,
            overwrite: false,
        }
    }

    fn read_output(path: &Path) -> Vec<Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn reads_elements_with_children() {
        let mut reader = Reader::from_str(OSM_SAMPLE);
        reader.trim_text(true);
        let elements = read_elements(&mut reader).unwrap();

        assert_eq!(elements.len(), 4);
        assert_eq!(elements[0].element_type, ElementType::Node);
        assert_eq!(elements[0].tags.len(), 6);
        assert_eq!(elements[1].attribute("id"), Some("2"));
        assert!(elements[1].tags.is_empty());
        assert_eq!(elements[2].node_refs, vec!["1", "2", "3"]);
        assert_eq!(elements[2].tags[1], Tag::new("name", "Panificio & Co"));
        assert_eq!(elements[3].member_refs, vec!["10", "2"]);
        assert!(elements[3].node_refs.is_empty());
    }

    #[test]
    fn tag_without_value_is_an_error() {
        let mut reader = Reader::from_str(r#"<osm><node id="1"><tag k="name"/></node></osm>"#);
        assert!(read_elements(&mut reader).is_err());
    }

    #[test]
    fn writes_one_record_per_line() {
        let dir = tempdir().unwrap();
        let osm_path = dir.path().join("milan.osm");
        fs::write(&osm_path, OSM_SAMPLE).unwrap();
        let user_config = config(&osm_path, false);

        let mut etl = OsmJsonEtl::new(&user_config);
        etl.process(dir.path()).unwrap();
        assert!(etl.is_cached(dir.path()).unwrap());

        let records = read_output(&dir.path().join("milan.json"));
        assert_eq!(records.len(), 4);
        assert_eq!(records[0]["amenity"], json!({"type": "general_attraction"}));
        assert_eq!(records[0]["address"]["street"], "Via Paolo Sarpi");
        assert_eq!(records[1], json!({"type": "node", "id": "2", "pos": [45.48, 9.18]}));
        assert_eq!(
            records[2],
            json!({
                "type": "way",
                "id": "10",
                "created": {"version": "1"},
                "name": "Panificio & Co",
                "amenity": {"type": "shop", "goods": "bakery"},
                "node_refs": ["1", "2", "3"]
            })
        );
        assert_eq!(records[3], json!({"type": "relation", "id": "20", "member_refs": ["10", "2"]}));

        etl.clean(dir.path()).unwrap();
        assert!(!etl.is_cached(dir.path()).unwrap());
    }

    #[test]
    fn pretty_output_indents_each_record() {
        let dir = tempdir().unwrap();
        let osm_path = dir.path().join("milan.osm");
        fs::write(&osm_path, OSM_SAMPLE).unwrap();
        let mut user_config = config(&osm_path, false);
        user_config.pretty = true;

        let mut etl = OsmJsonEtl::new(&user_config);
        etl.process(dir.path()).unwrap();

        let output = fs::read_to_string(dir.path().join("milan.json")).unwrap();
        assert!(output.starts_with("{\n  \"type\": \"node\",\n"));
        assert!(output.contains(
            "\n}\n{\n  \"type\": \"node\",\n  \"pos\": [\n    45.48,\n    9.18\n  ],\n  \"id\": \"2\"\n}\n"
        ));
        let records: Vec<Value> = serde_json::Deserializer::from_str(&output)
            .into_iter::<Value>()
            .map(|record| record.unwrap())
            .collect();
        assert_eq!(records.len(), 4);
        assert_eq!(records[1], json!({"type": "node", "id": "2", "pos": [45.48, 9.18]}));
    }

    #[test]
    fn malformed_coordinate_aborts_by_default() {
        let dir = tempdir().unwrap();
        let osm_path = dir.path().join("bad.osm");
        fs::write(&osm_path, r#"<osm><node id="1" lat="x" lon="9.1"/><node id="2"/></osm>"#).unwrap();
        let user_config = config(&osm_path, false);

        let mut etl = OsmJsonEtl::new(&user_config);
        assert!(etl.process(dir.path()).is_err());
        assert!(!etl.is_cached(dir.path()).unwrap());
    }

    #[test]
    fn malformed_coordinate_can_be_skipped() {
        let dir = tempdir().unwrap();
        let osm_path = dir.path().join("bad.osm");
        fs::write(&osm_path, r#"<osm><node id="1" lat="x" lon="9.1"/><node id="2"/></osm>"#).unwrap();
        let user_config = config(&osm_path, true);

        let mut etl = OsmJsonEtl::new(&user_config);
        etl.process(dir.path()).unwrap();
        let records = read_output(&dir.path().join("milan.json"));
        assert_eq!(records, vec![json!({"type": "node", "id": "2"})]);
    }

    #[test]
    fn reads_xz_compressed_input() {
        let dir = tempdir().unwrap();
        let osm_path = dir.path().join("milan.osm.xz");
        let mut encoder = xz::write::XzEncoder::new(fs::File::create(&osm_path).unwrap(), 6);
        encoder.write_all(OSM_SAMPLE.as_bytes()).unwrap();
        encoder.finish().unwrap();
        let user_config = config(&osm_path, false);

        let mut etl = OsmJsonEtl::new(&user_config);
        etl.process(dir.path()).unwrap();
        assert_eq!(read_output(&dir.path().join("milan.json")).len(), 4);
    }
}
