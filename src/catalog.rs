//! # Catalog
//!
//! Finds the STL files in the input folder and asks the user to pick one.

use log::debug;
use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

const RULE: &str = "-----------------------------------------";

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("no .stl files found")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("selection {index} is out of range, {count} files found")]
    OutOfRange { index: usize, count: usize },
    #[error("Couldn't read selection")]
    IO(#[from] io::Error),
}

/// One discovered input file
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct StlEntry {
    pub path: PathBuf,
    /// file name without the `.stl` suffix
    pub name: String,
}

/// List the `.stl` files in `folder`, sorted alphabetically
pub fn discover<P: AsRef<Path>>(folder: P) -> io::Result<Vec<StlEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if let Some(name) = file_name.strip_suffix(".stl") {
            entries.push(StlEntry {
                path: entry.path(),
                name: name.to_string(),
            });
        }
    }
    entries.sort();
    debug!("found {} stl files", entries.len());
    Ok(entries)
}

/// Print the count and the numbered list of names
pub fn print_listing<W: Write>(entries: &[StlEntry], out: &mut W) -> io::Result<()> {
    writeln!(out, "Items found: {}", entries.len())?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Files found:")?;
    for (i, entry) in entries.iter().enumerate() {
        writeln!(out, "{}: {}", i, entry.name)?;
    }
    writeln!(out, "{}", RULE)
}

/// Map a typed index to an entry
pub fn select<'a>(entries: &'a [StlEntry], input: &str) -> Result<&'a StlEntry, SelectionError> {
    if entries.is_empty() {
        return Err(SelectionError::Empty);
    }
    let input = input.trim();
    let index = input
        .parse::<usize>()
        .map_err(|_| SelectionError::NotANumber(input.to_string()))?;
    entries.get(index).ok_or(SelectionError::OutOfRange {
        index,
        count: entries.len(),
    })
}

/// Ask for a file index and read one line from `input`
pub fn prompt_selection<'a, R: BufRead, W: Write>(
    entries: &'a [StlEntry],
    input: &mut R,
    out: &mut W,
) -> Result<&'a StlEntry, SelectionError> {
    if entries.is_empty() {
        return Err(SelectionError::Empty);
    }
    write!(out, "Choose a file: ")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    select(entries, &line)
}
