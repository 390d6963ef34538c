//! Resolves the report files named on the command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

/// Builds the ordered input list: `files` as given, then the `*.xml` files of each
/// directory sorted by name.
///
/// Fails before anything is decoded when a file or directory does not exist, or when
/// a directory path is not a directory.
pub fn collect_inputs(files: &[PathBuf], directories: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    for file in files {
        if !file.exists() {
            bail!("Specified file doesn't exist <{}>", file.display());
        }
        inputs.push(file.clone());
    }

    for dir in directories {
        if !dir.exists() {
            bail!("Specified directory doesn't exist <{}>", dir.display());
        }
        if !dir.is_dir() {
            bail!("Specified directory isn't a directory <{}>", dir.display());
        }
        inputs.extend(xml_files(dir)?);
    }

    Ok(inputs)
}

fn xml_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list directory <{}>", dir.display()))?;

    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list directory <{}>", dir.display()))?
            .path();
        if path.is_file() && has_xml_extension(&path) {
            found.push(path);
        }
    }

    found.sort();
    Ok(found)
}

fn has_xml_extension(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.to_ascii_lowercase().ends_with(".xml"))
}
