//! Persisted CLI defaults.
//!
//! A small JSON file under the user's config directory remembers the root
//! directory to scan when none is given on the command line.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Root directory used when nothing has been configured.
pub const FALLBACK_ROOT_DIR: &str = "/var/lib/bagmerge/bags";

#[derive(Debug, Serialize, Deserialize)]
struct Defaults {
    root_dir: String,
}

fn defaults_path() -> Result<PathBuf> {
    let home = env::var_os("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("bagmerge")
        .join("defaults"))
}

/// Root directory to use when the command line does not name one.
pub fn default_root_dir() -> Result<PathBuf> {
    Ok(load(&defaults_path()?)?
        .map(|d| PathBuf::from(d.root_dir))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_ROOT_DIR)))
}

/// Persist `root_dir` as the default; returns the defaults file path.
pub fn set_default_root_dir(root_dir: &Path) -> Result<PathBuf> {
    let path = defaults_path()?;
    store(&path, root_dir)?;
    Ok(path)
}

fn load(path: &Path) -> Result<Option<Defaults>> {
    match fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents)
            .map(Some)
            .with_context(|| format!("malformed defaults file {}", path.display())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => {
            Err(e).with_context(|| format!("cannot read defaults file {}", path.display()))
        }
    }
}

fn store(path: &Path, root_dir: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let defaults = Defaults {
        root_dir: root_dir.display().to_string(),
    };
    let json = serde_json::to_string_pretty(&defaults)?;
    fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))
}
