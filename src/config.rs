use crate::{
    material::{MaterialError, MaterialTable},
    mesh::DEFAULT_DENSITY,
};
use log::LevelFilter;
use std::path::PathBuf;
use structopt::StructOpt;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error types for configuration
pub enum ConfigError {
    #[error("resolution must be between 1 and 1000")]
    Resolution,
    #[error("density must be a positive number")]
    Density,
    #[error("--material requires --materials")]
    MaterialTable,
    #[error("Not a decimal number")]
    ParseFloat(#[from] std::num::ParseFloatError),
    #[error("Not a whole number")]
    ParseInt(#[from] std::num::ParseIntError),
    #[error("Error reading materials")]
    Material(#[from] MaterialError),
    #[error("Error parsing config")]
    Clap(#[from] clap::Error),
}

fn parse_resolution(src: &str) -> Result<u32, ConfigError> {
    let resolution = src.parse::<u32>()?;
    if resolution < 1 || resolution > 1000 {
        Err(ConfigError::Resolution)
    } else {
        Ok(resolution)
    }
}

fn parse_density(src: &str) -> Result<f64, ConfigError> {
    let density = src.parse::<f64>()?;
    if !density.is_finite() || density <= 0. {
        Err(ConfigError::Density)
    } else {
        Ok(density)
    }
}

// set up program arguments, every option has a default so running with no
// arguments only asks for the file
#[derive(Debug, StructOpt)]
#[structopt(name = "stl_inspect")]
pub struct Opt {
    /// Folder searched for .stl files
    #[structopt(long, parse(from_os_str), default_value = "./STL")]
    pub stl_folder: PathBuf,

    /// Folder receiving the zip archives
    #[structopt(long, parse(from_os_str), default_value = "./Report")]
    pub report_folder: PathBuf,

    /// Voxels along the shortest side of the bounding box
    #[structopt(short, long, default_value = "100", parse(try_from_str = parse_resolution))]
    pub resolution: u32,

    /// Density used for the mass, overrides --material
    #[structopt(long, parse(try_from_str = parse_density))]
    pub density: Option<f64>,

    /// JSON material table
    #[structopt(long, parse(from_os_str))]
    pub materials: Option<PathBuf>,

    /// Material name looked up in --materials
    #[structopt(long)]
    pub material: Option<String>,

    /// Write an svg wireframe of the mesh to this file
    #[structopt(long, parse(from_os_str))]
    pub preview: Option<PathBuf>,

    #[structopt(long)]
    pub debug: bool,
}

impl Opt {
    pub fn log_level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

/// Resolved run settings
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub stl_folder: PathBuf,
    pub report_folder: PathBuf,
    pub resolution: u32,
    pub density: f64,
    pub preview: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            stl_folder: PathBuf::from("./STL"),
            report_folder: PathBuf::from("./Report"),
            resolution: 100,
            density: DEFAULT_DENSITY,
            preview: None,
        }
    }
}

impl Settings {
    pub fn from_opt(opt: &Opt) -> Result<Settings, ConfigError> {
        let density = match (opt.density, &opt.material, &opt.materials) {
            (Some(density), _, _) => density,
            (None, Some(name), Some(path)) => MaterialTable::from_file(path)?.density(name)?,
            (None, Some(_), None) => return Err(ConfigError::MaterialTable),
            (None, None, _) => DEFAULT_DENSITY,
        };
        Ok(Settings {
            stl_folder: opt.stl_folder.clone(),
            report_folder: opt.report_folder.clone(),
            resolution: opt.resolution,
            density,
            preview: opt.preview.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Opt, ConfigError> {
        let mut argv = vec!["stl_inspect"];
        argv.extend_from_slice(args);
        Ok(Opt::from_iter_safe(argv)?)
    }

    #[test]
    fn defaults_match_plain_run() {
        let opt = parse(&[]).unwrap();
        assert_eq!(Settings::from_opt(&opt).unwrap(), Settings::default());
        assert_eq!(opt.log_level(), LevelFilter::Info);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(&["-r", "0"]).is_err());
        assert!(parse(&["--resolution", "5000"]).is_err());
        assert!(parse(&["--density", "-1"]).is_err());
        assert!(parse(&["--density", "abc"]).is_err());
    }

    #[test]
    fn density_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("materials.json");
        std::fs::write(&table, r#"{"TableName": "t", "Materials": {"pla": {"Density": 1240.0}}}"#)
            .unwrap();
        let table = table.to_str().unwrap();

        let opt = parse(&["--materials", table, "--material", "PLA"]).unwrap();
        assert_eq!(Settings::from_opt(&opt).unwrap().density, 1240.0);

        let opt = parse(&["--materials", table, "--material", "pla", "--density", "2"]).unwrap();
        assert_eq!(Settings::from_opt(&opt).unwrap().density, 2.0);

        let opt = parse(&["--material", "pla"]).unwrap();
        assert!(matches!(Settings::from_opt(&opt), Err(ConfigError::MaterialTable)));
    }
}
