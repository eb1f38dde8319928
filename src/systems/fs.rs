use std::fs;
use std::io;
use std::path::Path;
use log::{debug, info, warn};
use walkdir::WalkDir;

/// Filesystem calls the history engine and the operation pipeline go through.
///
/// None of the mutating calls overwrite: an occupied target fails with
/// `ErrorKind::AlreadyExists`, a missing source with `ErrorKind::NotFound`.
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    /// Copies a file or a whole directory tree.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn move_item(&self, from: &Path, to: &Path) -> io::Result<()>;
    /// Removes a file or a whole directory tree.
    fn remove(&self, path: &Path) -> io::Result<()>;
    fn create_dir(&self, path: &Path) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }

    fn ensure_vacant(&self, path: &Path) -> io::Result<()> {
        if self.exists(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", path.display()),
            ));
        }
        Ok(())
    }

    /// Copies a directory tree. On failure the partial `to` tree is removed.
    fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
        Self::copy_entries(from, to).map_err(|e| {
            warn!("Copy of {} failed ({}), removing partial {}", from.display(), e, to.display());
            let _ = fs::remove_dir_all(to);
            e
        })
    }

    fn copy_entries(from: &Path, to: &Path) -> io::Result<()> {
        for entry in WalkDir::new(from) {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(from)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
            let dest_path = to.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest_path)?;
            } else {
                fs::copy(entry.path(), &dest_path)?;
            }
        }
        Ok(())
    }
}

fn from_fs_extra(err: fs_extra::error::Error) -> io::Error {
    use fs_extra::error::ErrorKind as Fx;
    let kind = match &err.kind {
        Fx::NotFound => io::ErrorKind::NotFound,
        Fx::PermissionDenied => io::ErrorKind::PermissionDenied,
        Fx::AlreadyExists => io::ErrorKind::AlreadyExists,
        Fx::Interrupted => io::ErrorKind::Interrupted,
        Fx::InvalidFile | Fx::InvalidFolder | Fx::InvalidFileName | Fx::InvalidPath => io::ErrorKind::InvalidInput,
        Fx::Io(e) => e.kind(),
        _ => io::ErrorKind::Other,
    };
    io::Error::new(kind, err.to_string())
}

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        let meta = fs::symlink_metadata(from)?;
        self.ensure_vacant(to)?;

        if meta.is_dir() {
            Self::copy_tree(from, to)
        } else {
            fs::copy(from, to).map(|_| ()).map_err(|e| {
                let _ = fs::remove_file(to);
                e
            })
        }
    }

    fn move_item(&self, from: &Path, to: &Path) -> io::Result<()> {
        let meta = fs::symlink_metadata(from)?;
        self.ensure_vacant(to)?;

        // Try atomic rename first
        match fs::rename(from, to) {
            Ok(_) => {
                debug!("Fast-moved {} to {}", from.display(), to.display());
                Ok(())
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound) => Err(e),
            Err(e) => {
                // Likely cross-volume, fall back to copy + delete
                info!("Rename failed ({}), copying {} to {}", e, from.display(), to.display());
                if meta.is_dir() {
                    Self::copy_tree(from, to)?;
                    fs::remove_dir_all(from)
                } else {
                    let options = fs_extra::file::CopyOptions::new();
                    fs_extra::file::move_file(from, to, &options)
                        .map(|_| ())
                        .map_err(from_fs_extra)
                }
            }
        }
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        let meta = fs::symlink_metadata(path)?;
        if meta.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        self.ensure_vacant(path)?;
        fs::create_dir_all(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_file_and_refuse_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("b.txt");
        fs::write(&src, b"hello").unwrap();

        let fs_impl = LocalFileSystem::new();
        fs_impl.copy(&src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"hello");

        let err = fs_impl.copy(&src, &dst).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_copy_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("tree");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("sub").join("f.txt"), b"x").unwrap();

        let dst = dir.path().join("copy");
        LocalFileSystem::new().copy(&src, &dst).unwrap();
        assert!(dst.join("sub").join("f.txt").is_file());
        assert!(src.join("sub").join("f.txt").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_tree_copy_leaves_no_partial_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("tree");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("ok.txt"), b"x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), src.join("dangling")).unwrap();

        let dst = dir.path().join("copy");
        assert!(LocalFileSystem::new().copy(&src, &dst).is_err());
        assert!(!dst.exists());
        assert!(src.join("ok.txt").is_file());
    }

    #[test]
    fn test_move_missing_source_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFileSystem::new()
            .move_item(&dir.path().join("nope"), &dir.path().join("dst"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_move_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        let err = LocalFileSystem::new().move_item(&a, &b).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&b).unwrap(), b"b");
    }

    #[test]
    fn test_remove_tree_and_create_dir() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("x").join("y");
        let fs_impl = LocalFileSystem::new();

        fs_impl.create_dir(&folder).unwrap();
        assert!(folder.is_dir());
        assert_eq!(fs_impl.create_dir(&folder).unwrap_err().kind(), io::ErrorKind::AlreadyExists);

        fs_impl.remove(&dir.path().join("x")).unwrap();
        assert!(!fs_impl.exists(&folder));
        assert_eq!(fs_impl.remove(&folder).unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
