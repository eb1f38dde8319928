use std::fs;
use std::path::{Path, PathBuf};
use crate::models::CommandError;

/// Directory where reversibly deleted items are parked until undo restores them.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_root(&self) -> Result<(), CommandError> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
        }
        Ok(())
    }

    /// Allocates a fresh backup path for `original`. Nothing is created on disk.
    pub fn backup_path_for(&self, original: &Path) -> Result<PathBuf, CommandError> {
        let name = original
            .file_name()
            .ok_or_else(|| CommandError::PathError(format!("No file name in {}", original.display())))?;
        let mut staged = std::ffi::OsString::from(format!("{}_", uuid::Uuid::new_v4().simple()));
        staged.push(name);
        Ok(self.root.join(staged))
    }

    /// Permanently drops everything parked here. After this, staged deletes can
    /// no longer be undone.
    pub fn purge(&self) -> Result<(), CommandError> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_paths_are_unique_and_keep_name() {
        let area = StagingArea::new("/stage");
        let a = area.backup_path_for(Path::new("/docs/report.txt")).unwrap();
        let b = area.backup_path_for(Path::new("/docs/report.txt")).unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("/stage"));
        assert!(a.to_string_lossy().ends_with("_report.txt"));
    }

    #[test]
    fn test_backup_path_needs_file_name() {
        let area = StagingArea::new("/stage");
        assert!(area.backup_path_for(Path::new("/")).is_err());
    }

    #[test]
    fn test_ensure_root_and_purge() {
        let dir = tempfile::tempdir().unwrap();
        let area = StagingArea::new(dir.path().join("staging"));
        area.ensure_root().unwrap();
        assert!(area.root().is_dir());
        fs::write(area.root().join("x"), b"x").unwrap();
        area.purge().unwrap();
        assert!(!area.root().exists());
    }
}
