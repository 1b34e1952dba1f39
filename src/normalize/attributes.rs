use std::collections::BTreeMap;

use crate::errors::{Error, Result};

/// Attributes describing who last edited an element and when.
pub const CREATED: [&str; 5] = ["version", "changeset", "timestamp", "user", "uid"];

#[derive(Debug, Default, PartialEq)]
pub struct ElementAttributes {
    pub created: BTreeMap<String, String>,
    pub pos: Option<[f64; 2]>,
    pub passthrough: BTreeMap<String, String>,
}

fn parse_coordinate(name: &str, value: &str) -> Result<f64> {
    let coordinate: f64 = value
        .trim()
        .parse()
        .map_err(|err| Error::malformed_coordinate(name, value, err))?;
    if !coordinate.is_finite() {
        return Err(Error::malformed_coordinate(name, value, "not a finite number"));
    }
    Ok(coordinate)
}

/// Splits element attributes into provenance, position and everything else.
///
/// `pos` is `[lat, lon]` and is only set when both coordinates are present.
/// A coordinate that is not a number fails the whole element.
pub fn extract_attributes(attributes: &[(String, String)]) -> Result<ElementAttributes> {
    let mut extracted = ElementAttributes::default();
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for (name, value) in attributes {
        match name.as_str() {
            "lat" => lat = Some(parse_coordinate(name, value)?),
            "lon" => lon = Some(parse_coordinate(name, value)?),
            name if CREATED.contains(&name) => {
                extracted.created.insert(name.to_string(), value.clone());
            }
            name => {
                extracted.passthrough.insert(name.to_string(), value.clone());
            }
        }
    }

    if let (Some(lat), Some(lon)) = (lat, lon) {
        extracted.pos = Some([lat, lon]);
    }
    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn separates_provenance_position_and_rest() {
        let extracted = extract_attributes(&attrs(&[
            ("id", "613579685"),
            ("lat", "45.4822582"),
            ("lon", "9.1802182"),
            ("version", "3"),
            ("user", "AnyFile"),
            ("visible", "true"),
        ]))
        .unwrap();

        assert_eq!(extracted.pos, Some([45.4822582, 9.1802182]));
        assert_eq!(extracted.created.len(), 2);
        assert_eq!(extracted.created["version"], "3");
        assert_eq!(extracted.created["user"], "AnyFile");
        assert_eq!(extracted.passthrough.len(), 2);
        assert_eq!(extracted.passthrough["id"], "613579685");
        assert_eq!(extracted.passthrough["visible"], "true");
    }

    #[test]
    fn partial_position_is_dropped() {
        let only_lat = extract_attributes(&attrs(&[("lat", "45.1")])).unwrap();
        assert_eq!(only_lat.pos, None);
        let only_lon = extract_attributes(&attrs(&[("lon", "9.1")])).unwrap();
        assert_eq!(only_lon.pos, None);
    }

    #[test]
    fn order_of_coordinates_does_not_matter() {
        let extracted = extract_attributes(&attrs(&[("lon", "9.5"), ("lat", "45.5")])).unwrap();
        assert_eq!(extracted.pos, Some([45.5, 9.5]));
    }

    #[test]
    fn malformed_coordinate_is_an_error() {
        let err = extract_attributes(&attrs(&[("lat", "north"), ("lon", "9.1")])).unwrap_err();
        assert!(err.message.contains("lat"));
        assert!(err.message.contains("north"));
    }

    #[test]
    fn non_finite_coordinates_are_errors() {
        for (lat, lon) in [("nan", "9.1"), ("45.1", "inf"), ("-infinity", "9.1"), ("NaN", "NaN")] {
            assert!(extract_attributes(&attrs(&[("lat", lat), ("lon", lon)])).is_err());
        }
    }

    #[test]
    fn no_attributes_no_fields() {
        assert_eq!(extract_attributes(&[]).unwrap(), ElementAttributes::default());
    }
}
