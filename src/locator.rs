use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::ScanError;

/// File name of a Maven project descriptor.
pub const DESCRIPTOR_FILE_NAME: &str = "pom.xml";

/// Recursively collect every `pom.xml` below `root`.
///
/// The root must be an existing, readable directory; anything else is fatal.
/// Unreadable entries further down the tree are logged and skipped. Symbolic
/// links are followed, and link loops are reported as unreadable entries.
pub fn find_descriptors(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !root.exists() {
        return Err(ScanError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    std::fs::read_dir(root).map_err(|source| ScanError::Unreadable {
        path: root.to_path_buf(),
        source,
    })?;

    info!("Scanning pom files under {}", root.display());

    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::Unreadable {
                    path: root.to_path_buf(),
                    source: e.into(),
                });
            }
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_file() && entry.file_name() == DESCRIPTOR_FILE_NAME {
            found.push(entry.into_path());
        }
    }

    Ok(found)
}
