use std::path::{Path, PathBuf};
use std::sync::Arc;
use log::{debug, info, warn};

use crate::models::{CommandError, HistoryManager, PathPair, Result, StagedItem, Transaction, TransactionDetails};
use crate::systems::fs::FileSystem;
use crate::utils::path_security::{validate_name, validate_path};
use crate::utils::staging::StagingArea;

/// Runs forward file operations and records each committed one in the history.
///
/// When a batch fails part way, the items that did go through are still
/// recorded so they can be undone, and the error is returned.
pub struct FileOperationManager {
    fs: Arc<dyn FileSystem>,
    history: Arc<HistoryManager>,
    staging: StagingArea,
}

impl FileOperationManager {
    pub fn new(fs: Arc<dyn FileSystem>, history: Arc<HistoryManager>, staging: StagingArea) -> Self {
        Self { fs, history, staging }
    }

    pub fn history(&self) -> &Arc<HistoryManager> {
        &self.history
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub fn copy_items(&self, paths: &[String], target_dir: &str) -> Result<Transaction> {
        info!("Copying items: {:?} -> {}", paths, target_dir);
        let (done, err) = self.transfer(paths, target_dir, |src, dest| self.fs.copy(src, dest))?;
        self.commit(TransactionDetails::Copy { items: done }, err)
    }

    pub fn move_items(&self, paths: &[String], target_dir: &str) -> Result<Transaction> {
        info!("Moving items: {:?} -> {}", paths, target_dir);
        let (done, err) = self.transfer(paths, target_dir, |src, dest| self.fs.move_item(src, dest))?;
        self.commit(TransactionDetails::Move { items: done }, err)
    }

    /// Deletes `paths`. Unless `permanently` is set, items are parked in the
    /// staging area so the delete can be undone. Permanent deletes leave no record.
    pub fn delete_items(&self, paths: &[String], permanently: bool) -> Result<Option<Transaction>> {
        let sources = validate_all(paths)?;

        if permanently {
            info!("Permanently deleting items: {:?}", paths);
            for src in &sources {
                self.fs.remove(src)?;
            }
            return Ok(None);
        }

        info!("Staging items for delete: {:?}", paths);
        self.staging.ensure_root()?;
        let mut done = Vec::new();
        let mut err = None;
        for src in sources {
            let staged = self
                .staging
                .backup_path_for(&src)
                .and_then(|backup| {
                    self.fs.move_item(&src, &backup)?;
                    Ok(backup)
                });
            match staged {
                Ok(backup) => done.push(StagedItem::staged(src, backup)),
                Err(e) => {
                    err = Some(e);
                    break;
                }
            }
        }
        self.commit(TransactionDetails::Delete { items: done }, err).map(Some)
    }

    pub fn rename_item(&self, path: &str, new_name: &str) -> Result<Transaction> {
        let from = validate_path(path)?;
        let name = validate_name(new_name)?;
        let parent = from
            .parent()
            .ok_or_else(|| CommandError::PathError(format!("Cannot rename root: {}", path)))?;
        let to = parent.join(name);

        info!("Renaming {} -> {}", from.display(), to.display());
        self.fs.move_item(&from, &to)?;
        self.commit(TransactionDetails::Rename { from, to }, None)
    }

    pub fn create_folder(&self, path: &str) -> Result<Transaction> {
        let folder = validate_path(path)?;
        info!("Creating folder {}", folder.display());
        self.fs.create_dir(&folder)?;
        self.commit(TransactionDetails::NewFolder { paths: vec![folder] }, None)
    }

    fn transfer(
        &self,
        paths: &[String],
        target_dir: &str,
        step: impl Fn(&Path, &Path) -> std::io::Result<()>,
    ) -> Result<(Vec<PathPair>, Option<CommandError>)> {
        let target_base = validate_path(target_dir)?;
        let sources = validate_all(paths)?;

        let mut done = Vec::new();
        for src in sources {
            let Some(file_name) = src.file_name() else {
                return Ok((done, Some(CommandError::PathError(format!("Invalid source: {}", src.display())))));
            };
            let dest = target_base.join(file_name);
            if let Err(e) = step(&src, &dest) {
                return Ok((done, Some(e.into())));
            }
            done.push(PathPair::new(src, dest));
        }
        Ok((done, None))
    }

    fn commit(&self, details: TransactionDetails, err: Option<CommandError>) -> Result<Transaction> {
        let transaction = Transaction::new(details);
        let recorded = transaction.validate().is_ok();
        if recorded {
            let dropped = self.history.push(transaction.clone());
            self.release(&dropped);
        }

        match err {
            None => Ok(transaction),
            Some(e) => {
                if recorded {
                    warn!("{:?} partly applied, recorded {}: {}", transaction.op_type(), transaction.id, e);
                }
                Err(e)
            }
        }
    }
}

impl FileOperationManager {
    /// Deletes the staged backups of records that can no longer be undone.
    /// Backups already moved back by an undo are simply gone.
    fn release(&self, dropped: &[Transaction]) {
        for transaction in dropped {
            let TransactionDetails::Delete { items } = &transaction.details else {
                continue;
            };
            for backup in items.iter().filter_map(|i| i.backup.as_deref()) {
                match self.fs.remove(backup) {
                    Ok(()) => debug!("Released backup {}", backup.display()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => warn!("Could not release backup {}: {}", backup.display(), e),
                }
            }
        }
    }
}

fn validate_all(paths: &[String]) -> Result<Vec<PathBuf>> {
    if paths.is_empty() {
        return Err(CommandError::PathError("No paths given".to_string()));
    }
    paths.iter().map(|p| validate_path(p)).collect()
}
