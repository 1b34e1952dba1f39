pub mod osm_json;

use std::fs;
use std::path::{Path, PathBuf};
use log::{info, error};

use crate::errors::Result;

/// One extract / transform / load stage whose result is a single file in the
/// working directory. A stage whose file already exists is not rerun.
pub trait Etl {
    type Input;
    type Output;

    fn etl_name(&self) -> &str;
    fn output_file_name(&self) -> String;

    fn extract(&mut self, dir: &Path) -> Result<Self::Input>;
    fn transform(&mut self, input: Self::Input) -> Result<Self::Output>;
    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()>;

    fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.output_file_name())
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        Ok(self.output_path(dir).try_exists()?)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        if self.is_cached(dir)? {
            info!(etl_name = self.etl_name(); "Removing previous output");
            fs::remove_file(self.output_path(dir))?;
        }
        Ok(())
    }

    fn process(&mut self, dir: &Path) -> Result<()> {
        info!(etl_name = self.etl_name(); "Starting ETL process");
        if self.is_cached(dir)? {
            info!(etl_name = self.etl_name(); "Using cached value");
            return Ok(());
        }

        info!(etl_name = self.etl_name(); "Extracting");
        let extracted = self.extract(dir);
        let input = logged(self.etl_name(), "Extraction", extracted)?;

        info!(etl_name = self.etl_name(); "Transforming");
        let transformed = self.transform(input);
        let output = logged(self.etl_name(), "Transformation", transformed)?;

        info!(etl_name = self.etl_name(); "Loading");
        let loaded = self.load(dir, output);
        logged(self.etl_name(), "Loading", loaded)?;

        info!(etl_name = self.etl_name(); "Process finished");
        Ok(())
    }
}

fn logged<T>(etl_name: &str, phase: &str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        error!(etl_name = etl_name, phase = phase, err = err.message.as_str(); "Phase failed with error");
    }
    result
}
