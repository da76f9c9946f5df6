//! # Report
//!
//! Fixed template text report of a mesh's physical and geometric attributes.

use crate::mesh::{MassProperties, Mesh};
use log::info;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

const RULE: &str = "-----------------------------------------";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("summary is missing {0}")]
    MissingField(&'static str),
    #[error("summary field {0} is not a number")]
    NonNumeric(&'static str),
    #[error("Couldn't write report")]
    IO(#[from] std::io::Error),
}

/// Snapshot of the attributes reported for one file. Fields are optional so
/// an incomplete snapshot is caught by the formatter instead of being
/// printed with a placeholder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshSummary {
    pub volume: Option<f64>,
    pub area: Option<f64>,
    pub mass: Option<f64>,
    pub density: Option<f64>,
    pub faces: Option<usize>,
    pub vertices: Option<usize>,
    pub filled_voxels: Option<usize>,
}

impl MeshSummary {
    pub fn new(mesh: &Mesh, props: &MassProperties, filled_voxels: usize) -> MeshSummary {
        MeshSummary {
            volume: Some(props.volume),
            area: Some(props.area),
            mass: Some(props.mass),
            density: Some(props.density),
            faces: Some(mesh.faces.len()),
            vertices: Some(mesh.vertices.len()),
            filled_voxels: Some(filled_voxels),
        }
    }
}

fn number(value: Option<f64>, name: &'static str) -> Result<f64, ReportError> {
    match value {
        None => Err(ReportError::MissingField(name)),
        Some(x) if !x.is_finite() => Err(ReportError::NonNumeric(name)),
        Some(x) => Ok(x),
    }
}

fn count(value: Option<usize>, name: &'static str) -> Result<usize, ReportError> {
    value.ok_or(ReportError::MissingField(name))
}

/// Render the report text
///
/// Rounded values always carry two decimals, volume and area are followed
/// by their unrounded value.
///
/// # Examples
///
/// ```
/// use stl_inspect::report::{render_report, MeshSummary};
/// let summary = MeshSummary {
///     volume: Some(1000.),
///     area: Some(600.),
///     mass: Some(1000.),
///     density: Some(1.),
///     faces: Some(12),
///     vertices: Some(8),
///     filled_voxels: Some(1000),
/// };
/// let text = render_report("cube", &summary).unwrap();
/// assert!(text.contains("Volume: 1000.00 U³ (1000.0)"));
/// assert!(text.contains("Voxels preenchidos: 1000"));
/// ```
pub fn render_report(filename: &str, summary: &MeshSummary) -> Result<String, ReportError> {
    let volume = number(summary.volume, "volume")?;
    let area = number(summary.area, "area")?;
    let mass = number(summary.mass, "mass")?;
    let density = number(summary.density, "density")?;
    let faces = count(summary.faces, "faces")?;
    let vertices = count(summary.vertices, "vertices")?;
    let filled_voxels = count(summary.filled_voxels, "filled_voxels")?;

    let lines = [
        format!("Analisando: {}", filename),
        RULE.to_string(),
        "Caracteristicas físicas".to_string(),
        RULE.to_string(),
        format!("Volume: {:.2} U³ ({:?})", volume, volume),
        RULE.to_string(),
        format!("Área: {:.2} U² ({:?})", area, area),
        RULE.to_string(),
        format!("Massa: {:.2} kg", mass),
        RULE.to_string(),
        format!("Densidade: {:.2} kg/m³", density),
        RULE.to_string(),
        "Caracteristicas geométricas".to_string(),
        RULE.to_string(),
        format!("Faces: {}", faces),
        RULE.to_string(),
        format!("Vertices: {}", vertices),
        RULE.to_string(),
        format!("Voxels preenchidos: {}", filled_voxels),
        RULE.to_string(),
    ];
    let mut text = String::from("\n");
    for line in &lines {
        text.push_str("    ");
        text.push_str(line);
        text.push('\n');
    }
    text.push_str("    ");
    Ok(text)
}

pub fn report_path<P: AsRef<Path>>(filename: &str, report_folder: P) -> PathBuf {
    report_folder.as_ref().join(format!("Relatorio_{}.txt", filename))
}

/// Render and write `Relatorio_<filename>.txt`, replacing any previous one.
/// Nothing is written when the summary is incomplete.
pub fn write_report<P: AsRef<Path>>(
    filename: &str,
    summary: &MeshSummary,
    report_folder: P,
) -> Result<PathBuf, ReportError> {
    let text = render_report(filename, summary)?;
    let path = report_path(filename, report_folder);
    fs::write(&path, text)?;
    info!("wrote report to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> MeshSummary {
        MeshSummary {
            volume: Some(1234.5678),
            area: Some(0.1 + 0.2),
            mass: Some(9.876),
            density: Some(0.5),
            faces: Some(12),
            vertices: Some(8),
            filled_voxels: Some(42),
        }
    }

    #[test]
    fn template_order_and_rounding() {
        let text = render_report("part", &summary()).unwrap();
        let fields: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('-'))
            .collect();
        assert_eq!(
            fields,
            vec![
                "Analisando: part",
                "Caracteristicas físicas",
                "Volume: 1234.57 U³ (1234.5678)",
                "Área: 0.30 U² (0.30000000000000004)",
                "Massa: 9.88 kg",
                "Densidade: 0.50 kg/m³",
                "Caracteristicas geométricas",
                "Faces: 12",
                "Vertices: 8",
                "Voxels preenchidos: 42",
            ]
        );
    }

    #[test]
    fn missing_mass_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut partial = summary();
        partial.mass = None;
        let result = write_report("part", &partial, dir.path());
        assert!(matches!(result, Err(ReportError::MissingField("mass"))));
        assert!(!report_path("part", dir.path()).exists());
    }

    #[test]
    fn nan_is_not_a_number() {
        let mut partial = summary();
        partial.volume = Some(f64::NAN);
        assert!(matches!(
            render_report("part", &partial),
            Err(ReportError::NonNumeric("volume"))
        ));
    }

    #[test]
    fn overwrites_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = report_path("part", dir.path());
        fs::write(&path, "old").unwrap();
        assert_eq!(write_report("part", &summary(), dir.path()).unwrap(), path);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("\n    Analisando: part\n"));
    }
}
