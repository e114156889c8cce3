//! File scanning for upload.
//!
//! Walks a local path into a flat list of upload tasks with destination
//! names normalized to forward slashes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;
use w3deploy_transfer::validate_destination_name;

use crate::error::DeployError;
use crate::types::UploadTask;

/// Scans `root` and returns one task per regular file, sorted by name.
///
/// A directory is walked recursively and names are relative to it. A
/// single file is uploaded under its own file name.
pub fn scan_upload_tasks(root: &Path) -> Result<Vec<UploadTask>, DeployError> {
    let metadata = std::fs::metadata(root)
        .map_err(|e| DeployError::InvalidPath(format!("{}: {e}", root.display())))?;

    let mut tasks = Vec::new();
    if metadata.is_file() {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| DeployError::InvalidPath(root.display().to_string()))?;
        tasks.push(UploadTask {
            source_path: root.to_path_buf(),
            destination_name: name,
            size: metadata.len(),
        });
    } else if metadata.is_dir() {
        let mut visited = HashSet::from([root.canonicalize()?]);
        walk_dir(root, root, &mut visited, &mut tasks)?;
    } else {
        return Err(DeployError::InvalidPath(format!(
            "{}: not a file or directory",
            root.display()
        )));
    }

    for task in &tasks {
        validate_destination_name(&task.destination_name)?;
    }
    tasks.sort_by(|a, b| a.destination_name.cmp(&b.destination_name));
    Ok(tasks)
}

/// Symlinks are followed; each directory is entered at most once.
fn walk_dir(
    root: &Path,
    current: &Path,
    visited: &mut HashSet<PathBuf>,
    tasks: &mut Vec<UploadTask>,
) -> Result<(), DeployError> {
    for entry in std::fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if metadata.is_dir() {
            if !visited.insert(path.canonicalize()?) {
                warn!(path = %path.display(), "skipping directory already visited");
                continue;
            }
            walk_dir(root, &path, visited, tasks)?;
        } else if metadata.is_file() {
            let rel_path = path.strip_prefix(root).map_err(std::io::Error::other)?;

            // Normalize to forward slashes.
            let name = rel_path.to_string_lossy().replace('\\', "/");
            tasks.push(UploadTask {
                source_path: path,
                destination_name: name,
                size: metadata.len(),
            });
        } else {
            warn!(path = %path.display(), "skipping entry that is not a regular file");
        }
    }

    Ok(())
}
