use serde::Deserialize;

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error types for material tables
pub enum MaterialError {
    #[error("Material {0} not found in table")]
    NotFound(String),
    #[error("Material {0} has an invalid density")]
    Density(String),
    #[error("Couldn't read material table")]
    IO(#[from] std::io::Error),
    #[error("Error parsing material table")]
    Json(#[from] serde_json::Error),
}

/// Named densities loaded from a JSON file
#[derive(Deserialize, Debug)]
pub struct MaterialTable {
    #[serde(rename = "TableName")]
    pub table_name: String,
    #[serde(rename = "Materials")]
    pub materials: HashMap<String, MaterialParams>,
}

#[derive(Deserialize, Debug)]
pub struct MaterialParams {
    #[serde(rename = "Density")]
    pub density: f64,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}

impl MaterialTable {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<MaterialTable, MaterialError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Density of `name`, names are matched case insensitively
    ///
    /// # Examples
    ///
    /// ```
    /// use stl_inspect::material::MaterialTable;
    /// let table: MaterialTable = serde_json::from_str(
    ///     r#"{"TableName": "shop", "Materials": {"PLA": {"Density": 1240.0}}}"#,
    /// ).unwrap();
    /// assert_eq!(table.density("pla").unwrap(), 1240.0);
    /// ```
    pub fn density(&self, name: &str) -> Result<f64, MaterialError> {
        let params = self
            .materials
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, params)| params)
            .ok_or_else(|| MaterialError::NotFound(name.to_string()))?;
        if params.density.is_finite() && params.density > 0. {
            Ok(params.density)
        } else {
            Err(MaterialError::Density(name.to_string()))
        }
    }
}
