mod etl;
mod data;
mod errors;
mod normalize;

use std::env;
use std::fs::{create_dir_all, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use crate::etl::osm_json::OsmJsonEtl;
use crate::etl::Etl;
use crate::errors::Result;

const DEFAULT_CONFIG_PATH: &str = "config/milan.json";

#[derive(Deserialize)]
pub struct UserConfig {
    pub data_path: String,
    pub output_name: String,
    #[serde(default)]
    pub pretty: bool,
    #[serde(default)]
    pub skip_malformed: bool,
    #[serde(default)]
    pub overwrite: bool,
}

fn load_user_config(path: &str) -> Result<UserConfig> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}


fn create_output_dir(config: &UserConfig) -> Result<PathBuf> {
    let input_fname = Path::new(&config.data_path)
        .file_name()
        .ok_or("Could not get input file name")?;
    let output_dir = Path::new("output").join(input_fname);
    create_dir_all(&output_dir)?;
    Ok(output_dir)
}

fn setup_logging() {
    Builder::with_level("info")
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn main() -> Result<()> {
    setup_logging();

    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let user_config = load_user_config(&config_path)?;
    let output_dir = create_output_dir(&user_config)?;

    let mut etl = OsmJsonEtl::new(&user_config);
    if user_config.overwrite {
        etl.clean(&output_dir)?;
    }
    etl.process(&output_dir)
}
