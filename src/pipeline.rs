//! # Pipeline
//!
//! One run over a selected file:
//! `Selected -> GridComputed -> FramesEncoded -> ReportWritten -> Archived -> Cleaned`.
//! A failing stage stops the run. Whatever was already written stays on
//! disk so it can be inspected.

use crate::{
    animation::{create_voxel_animation, AnimationError},
    archive::{assemble, ArchiveError},
    catalog::{SelectionError, StlEntry},
    config::{ConfigError, Settings},
    mesh::Mesh,
    preview::write_preview,
    report::{write_report, MeshSummary, ReportError},
    stl::StlError,
    voxel::{pitch_for, voxelize, VoxelError},
};
use log::{debug, error, info, warn};
use std::{fmt, fs, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("Couldn't load mesh")]
    Mesh(#[from] StlError),
    #[error(transparent)]
    Voxel(#[from] VoxelError),
    #[error(transparent)]
    Animation(#[from] AnimationError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("IO error")]
    IO(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Selected,
    GridComputed,
    FramesEncoded,
    ReportWritten,
    Archived,
    Cleaned,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Selected => "SELECTED",
            Stage::GridComputed => "GRID_COMPUTED",
            Stage::FramesEncoded => "FRAMES_ENCODED",
            Stage::ReportWritten => "REPORT_WRITTEN",
            Stage::Archived => "ARCHIVED",
            Stage::Cleaned => "CLEANED",
        };
        write!(f, "{}", name)
    }
}

/// Tracks how far a run got
#[derive(Debug)]
pub struct Run {
    pub name: String,
    stage: Stage,
}

impl Run {
    pub fn new(entry: &StlEntry) -> Run {
        Run {
            name: entry.name.clone(),
            stage: Stage::Selected,
        }
    }

    pub fn stage(&self) -> Stage { self.stage }

    fn advance(&mut self, next: Stage) {
        debug_assert!(next > self.stage);
        debug!("{}: {} -> {}", self.name, self.stage, next);
        self.stage = next;
    }
}

/// Result of a completed run
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutcome {
    pub archive: PathBuf,
    pub summary: MeshSummary,
    pub stage: Stage,
    /// Set when a preview was requested and written
    pub preview: Option<PathBuf>,
}

/// Load, voxelize, animate, report and archive one file
pub fn run(entry: &StlEntry, settings: &Settings) -> Result<RunOutcome, PipelineError> {
    let mut run = Run::new(entry);
    let result = run_stages(&mut run, entry, settings);
    if let Err(e) = &result {
        error!("{} failed after {}: {}", run.name, run.stage(), e);
    }
    result
}

fn run_stages(run: &mut Run, entry: &StlEntry, settings: &Settings) -> Result<RunOutcome, PipelineError> {
    fs::create_dir_all(&settings.report_folder)?;

    let mesh = Mesh::load(&entry.path)?;
    let props = mesh.mass_properties(settings.density);
    let pitch = pitch_for(&mesh, settings.resolution)?;
    let grid = voxelize(&mesh, pitch)?;
    let filled_voxels = grid.filled_count();
    info!("{:?} voxel grid, {} filled", grid.shape(), filled_voxels);
    run.advance(Stage::GridComputed);

    create_voxel_animation(&grid, &run.name, &settings.report_folder)?;
    drop(grid);
    run.advance(Stage::FramesEncoded);

    let summary = MeshSummary::new(&mesh, &props, filled_voxels);
    write_report(&run.name, &summary, &settings.report_folder)?;
    run.advance(Stage::ReportWritten);

    let archive = assemble(&run.name, &settings.report_folder)?;
    run.advance(Stage::Archived);
    run.advance(Stage::Cleaned);

    // preview failures never fail a finished run
    let preview = settings.preview.as_ref().and_then(|path| match write_preview(&mesh, path) {
        Ok(()) => Some(path.clone()),
        Err(e) => {
            warn!("Couldn't write preview to {}: {}", path.display(), e);
            None
        },
    });

    Ok(RunOutcome {
        archive,
        summary,
        stage: run.stage(),
        preview,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered() {
        assert!(Stage::Selected < Stage::GridComputed);
        assert!(Stage::Archived < Stage::Cleaned);
        assert_eq!(Stage::FramesEncoded.to_string(), "FRAMES_ENCODED");
    }

    #[test]
    fn unreadable_mesh_stops_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.stl");
        fs::write(&path, b"not an stl").unwrap();
        let entry = StlEntry {
            path,
            name: "broken".to_string(),
        };
        let settings = Settings {
            report_folder: dir.path().join("Report"),
            ..Settings::default()
        };
        assert!(matches!(run(&entry, &settings), Err(PipelineError::Mesh(_))));
        assert_eq!(fs::read_dir(&settings.report_folder).unwrap().count(), 0);
    }
}
