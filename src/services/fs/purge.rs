use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::core::errors::{Error, Result};

/// Companion files Windows writes next to downloaded files to record
/// their origin zone.
pub const ZONE_MARKER_SUFFIX: &str = ":Zone.Identifier";

/// What a purge run did: every marker file it removed, and every one it
/// could not remove together with the reason.
#[derive(Debug, Default)]
pub struct PurgeReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, io::Error)>,
}

impl PurgeReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Recursively deletes every regular file under `root` whose name ends
/// with [`ZONE_MARKER_SUFFIX`].
///
/// A root that is not a directory is a terminal error. Per-file deletion
/// failures are recorded in the report and never abort the walk. Symlinks
/// are not followed, so the walk cannot loop.
pub fn purge_zone_markers(root: &Path) -> Result<PurgeReport> {
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }

    let mut report = PurgeReport::default();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("walk error under {}: {}", root.display(), err);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        if !entry.file_name().to_string_lossy().ends_with(ZONE_MARKER_SUFFIX) {
            continue;
        }

        let path = entry.into_path();
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("removed {}", path.display());
                report.removed.push(path);
            }
            Err(err) => {
                tracing::warn!("failed to remove {}: {}", path.display(), err);
                report.failed.push((path, err));
            }
        }
    }

    Ok(report)
}
