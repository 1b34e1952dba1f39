pub mod osm;
pub mod record;
