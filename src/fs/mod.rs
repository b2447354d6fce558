// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

/// Abstract filesystem interface used by the command catalog.
pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace `path` with `contents` so that readers never observe a
    /// partially written file.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading file {:?}", path))
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| format!("creating dir {:?}", parent))?;
        }

        let temp_path = temp_sibling(path);
        {
            let mut file = fs::File::create(&temp_path)
                .with_context(|| format!("creating file {:?}", temp_path))?;
            file.write_all(contents)
                .with_context(|| format!("writing to file {:?}", temp_path))?;
            file.sync_all()
                .with_context(|| format!("syncing file {:?}", temp_path))?;
        }

        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e).with_context(|| format!("replacing {:?}", path));
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// `dir/.name.tmp` next to the target, so the final rename stays on one
/// filesystem.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "catalog".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_parents_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("custom_commands.json");

        RealFileSystem.write_atomic(&target, b"[]").unwrap();
        RealFileSystem.write_atomic(&target, b"[1]").unwrap();

        assert_eq!(RealFileSystem.read_to_string(&target).unwrap(), "[1]");
        assert!(!temp_sibling(&target).exists());
    }
}
