//! Entry discovery under the entries directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::types::{Interpreter, Violation};

/// The only file names an entry may contain.
pub const ALLOWED_FILE_NAMES: [&str; 5] =
    ["main.js", "main.cjs", "main.mjs", "main.ts", "main.coffee"];

/// The single script file of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFile {
    pub name: String,
    pub path: PathBuf,
}

impl EntryFile {
    pub fn interpreter(&self) -> Interpreter {
        Interpreter::for_file_name(&self.name)
    }
}

/// List entry names: immediate subdirectories of `entries_dir`, sorted.
///
/// Plain files next to the entry directories are ignored.
pub fn list_entries(entries_dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(entries_dir)
        .with_context(|| format!("read entries dir {}", entries_dir.display()))?
    {
        let entry = entry.context("read entry")?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", entry.path().display()))?;
        if !file_type.is_dir() {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    debug!(count = names.len(), dir = %entries_dir.display(), "entries listed");
    Ok(names)
}

/// Find the single script in `entry_dir`.
///
/// The outer `Result` carries I/O failures. The inner one is a structural
/// violation: no file, more than one file, or a name outside
/// [`ALLOWED_FILE_NAMES`]. Subdirectories are not counted as files.
pub fn entry_file(entry_dir: &Path) -> Result<Result<EntryFile, Violation>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(entry_dir)
        .with_context(|| format!("read entry dir {}", entry_dir.display()))?
    {
        let entry = entry.context("read entry file")?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", entry.path().display()))?;
        if file_type.is_dir() {
            continue;
        }
        files.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
    }
    files.sort();

    let (name, path) = match files.len() {
        0 => {
            return Ok(Err(Violation::structural(format!(
                "no file in {}",
                entry_dir.display()
            ))));
        }
        1 => files.remove(0),
        count => {
            let names: Vec<&str> = files.iter().map(|(name, _)| name.as_str()).collect();
            return Ok(Err(Violation::structural(format!(
                "expected exactly one file in {}, found {count}: {}",
                entry_dir.display(),
                names.join(", ")
            ))));
        }
    };

    if !ALLOWED_FILE_NAMES.contains(&name.as_str()) {
        return Ok(Err(Violation::structural(format!(
            "file name {name} is not one of {}",
            ALLOWED_FILE_NAMES.join(", ")
        ))));
    }
    Ok(Ok(EntryFile { name, path }))
}
