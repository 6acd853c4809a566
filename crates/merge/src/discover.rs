//! Container file discovery.
//!
//! Scans a root directory recursively for container files and partitions
//! them into regular sources and transient sources. Transient sources live
//! under the `transient_output/` subdirectory of the root; everything else
//! is regular. Both sets are sorted by path so source ordinals, and with
//! them the merge tie-break, are reproducible across runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Subdirectory of the root holding transient-output containers.
pub const TRANSIENT_DIR: &str = "transient_output";

/// File extension of container files.
pub const CONTAINER_EXT: &str = "bag";

/// The two disjoint source sets of one run.
#[derive(Debug, Default)]
pub struct DiscoveredFiles {
    /// Regular sources, sorted by path
    pub regular: Vec<PathBuf>,

    /// Transient sources, sorted by path
    pub transient: Vec<PathBuf>,
}

impl DiscoveredFiles {
    /// Total number of discovered files.
    pub fn len(&self) -> usize {
        self.regular.len() + self.transient.len()
    }

    /// Whether nothing was discovered.
    pub fn is_empty(&self) -> bool {
        self.regular.is_empty() && self.transient.is_empty()
    }
}

/// Discover container files under `root`.
///
/// A missing `transient_output/` subdirectory simply yields an empty
/// transient set; a missing root is an error.
pub fn discover(root: &Path) -> io::Result<DiscoveredFiles> {
    let mut files = DiscoveredFiles::default();
    let transient_root = root.join(TRANSIENT_DIR);

    visit(root, &mut |path| {
        if path.starts_with(&transient_root) {
            files.transient.push(path);
        } else {
            files.regular.push(path);
        }
    })?;

    files.regular.sort();
    files.transient.sort();
    Ok(files)
}

fn visit(dir: &Path, found: &mut impl FnMut(PathBuf)) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            visit(&path, found)?;
        } else if path.extension().map_or(false, |ext| ext == CONTAINER_EXT) {
            found(path);
        }
    }
    Ok(())
}
