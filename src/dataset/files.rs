use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DatasetError;
use crate::models::{ImagePair, Side};

/// Files directly under `folder` whose name ends with `extension` and contains `marker`,
/// sorted by file name
pub fn all_files_under(folder: &Path, extension: &str, marker: &str) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(DatasetError::MissingFolder(folder.to_path_buf()).into());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(folder)
        .with_context(|| format!("Failed to list {}", folder.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.ends_with(extension) && name.contains(marker) {
            files.push(entry.path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Files of one camera side
pub fn side_files(folder: &Path, extension: &str, side: Side) -> Result<Vec<PathBuf>> {
    all_files_under(folder, extension, side.marker())
}

/// Pair the left and right images of a folder by sorted position
pub fn pair_files(folder: &Path, extension: &str) -> Result<Vec<ImagePair>> {
    let left = side_files(folder, extension, Side::Left)?;
    let right = side_files(folder, extension, Side::Right)?;

    if left.len() != right.len() {
        return Err(DatasetError::SideMismatch {
            folder: folder.to_path_buf(),
            left: left.len(),
            right: right.len(),
        }
        .into());
    }

    Ok(left
        .into_iter()
        .zip(right)
        .map(|(left, right)| ImagePair { left, right })
        .collect())
}
