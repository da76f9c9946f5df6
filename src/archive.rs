//! # Archive
//!
//! Folds the animation and the report for one file into `<name>.zip` and
//! removes them once the archive is safely on disk.

use crate::report::report_path;
use log::{debug, info};
use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};
use tempfile::{NamedTempFile, PersistError};
use thiserror::Error;
use zip::{result::ZipError, write::SimpleFileOptions, CompressionMethod, ZipWriter};

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("missing artifact {0}")]
    MissingArtifact(PathBuf),
    #[error("Couldn't write archive")]
    IO(#[from] io::Error),
    #[error("Couldn't build zip")]
    Zip(#[from] ZipError),
    #[error("Couldn't move archive into place")]
    Persist(#[from] PersistError),
}

/// Paths of the artifacts folded into one archive
#[derive(Clone, Debug, PartialEq)]
pub struct Artifacts {
    pub gif: PathBuf,
    pub report: PathBuf,
    pub archive: PathBuf,
}

impl Artifacts {
    pub fn new<P: AsRef<Path>>(filename: &str, report_folder: P) -> Artifacts {
        let folder = report_folder.as_ref();
        Artifacts {
            gif: folder.join(format!("{}.gif", filename)),
            report: report_path(filename, folder),
            archive: folder.join(format!("{}.zip", filename)),
        }
    }
}

fn add_entry<W: io::Write + io::Seek>(
    zip: &mut ZipWriter<W>,
    path: &Path,
    name: &str,
    options: SimpleFileOptions,
) -> Result<(), ArchiveError> {
    let mut source = File::open(path)?;
    zip.start_file(name, options)?;
    let bytes = io::copy(&mut source, zip)?;
    debug!("added {} ({} bytes)", name, bytes);
    Ok(())
}

/// Build `<report_folder>/<filename>.zip` from the gif and report written
/// earlier, then delete both.
///
/// The archive is staged in a temporary file next to its destination and
/// only moved into place once complete. If anything fails before that the
/// gif and report are left untouched.
pub fn assemble<P: AsRef<Path>>(filename: &str, report_folder: P) -> Result<PathBuf, ArchiveError> {
    let artifacts = Artifacts::new(filename, &report_folder);
    for path in &[&artifacts.gif, &artifacts.report] {
        if !path.is_file() {
            return Err(ArchiveError::MissingArtifact(path.to_path_buf()));
        }
    }

    let staged = NamedTempFile::new_in(report_folder.as_ref())?;
    {
        let mut zip = ZipWriter::new(staged.as_file());
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        add_entry(&mut zip, &artifacts.gif, &format!("{}.gif", filename), options)?;
        add_entry(
            &mut zip,
            &artifacts.report,
            &format!("Relatorio_{}.txt", filename),
            options,
        )?;
        zip.finish()?;
    }
    staged.as_file().sync_all()?;
    staged.persist(&artifacts.archive)?;
    info!("archive saved to {}", artifacts.archive.display());

    fs::remove_file(&artifacts.gif)?;
    fs::remove_file(&artifacts.report)?;
    debug!(
        "removed {} and {}",
        artifacts.gif.display(),
        artifacts.report.display()
    );
    Ok(artifacts.archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn write_artifacts(dir: &Path, name: &str) -> (Vec<u8>, Vec<u8>) {
        let gif = b"GIF89a not really".to_vec();
        let txt = format!("\n    Analisando: {}\n", name).into_bytes();
        let artifacts = Artifacts::new(name, dir);
        fs::write(&artifacts.gif, &gif).unwrap();
        fs::write(&artifacts.report, &txt).unwrap();
        (gif, txt)
    }

    #[test]
    fn archive_round_trip_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let (gif, txt) = write_artifacts(dir.path(), "part");
        let path = assemble("part", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("part.zip"));

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);
        let mut names: Vec<_> = archive.file_names().map(String::from).collect();
        names.sort();
        assert_eq!(names, vec!["Relatorio_part.txt", "part.gif"]);
        for (name, expected) in &[("part.gif", &gif), ("Relatorio_part.txt", &txt)] {
            let mut contents = Vec::new();
            archive.by_name(name).unwrap().read_to_end(&mut contents).unwrap();
            assert_eq!(&contents, *expected);
        }

        let artifacts = Artifacts::new("part", dir.path());
        assert!(!artifacts.gif.exists());
        assert!(!artifacts.report.exists());
        // nothing but the archive is left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_report_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Artifacts::new("part", dir.path());
        fs::write(&artifacts.gif, b"gif").unwrap();
        let result = assemble("part", dir.path());
        match result {
            Err(ArchiveError::MissingArtifact(path)) => assert_eq!(path, artifacts.report),
            other => panic!("unexpected {:?}", other),
        }
        assert!(artifacts.gif.exists());
        assert!(!artifacts.archive.exists());
    }

    #[test]
    fn rerun_overwrites_archive() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Artifacts::new("part", dir.path());
        fs::write(&artifacts.archive, b"stale").unwrap();
        write_artifacts(dir.path(), "part");
        assemble("part", dir.path()).unwrap();
        let archive = ZipArchive::new(File::open(&artifacts.archive).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn failed_persist_keeps_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), "part");
        let artifacts = Artifacts::new("part", dir.path());
        // a directory in the archive's place can't be replaced by a file
        fs::create_dir(&artifacts.archive).unwrap();
        assert!(assemble("part", dir.path()).is_err());
        assert!(artifacts.gif.exists());
        assert!(artifacts.report.exists());
        assert!(artifacts.archive.is_dir());
    }
}
