use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use log::{info, warn};

use crate::models::{ReturnResult, Transaction, TransactionDetails};
use crate::systems::fs::FileSystem;

/// Performs the filesystem side of undo and redo. Implementations report an
/// outcome and never touch the history stack.
pub trait StorageHistoryOperations: Send + Sync {
    fn undo(&self, transaction: &Transaction) -> ReturnResult;
    fn redo(&self, transaction: &Transaction) -> ReturnResult;
}

pub struct FsHistoryOperations {
    fs: Arc<dyn FileSystem>,
    cancel_flag: Arc<AtomicBool>,
}

impl FsHistoryOperations {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::with_cancel_flag(fs, Arc::new(AtomicBool::new(false)))
    }

    pub fn with_cancel_flag(fs: Arc<dyn FileSystem>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { fs, cancel_flag }
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel_flag.clone()
    }

    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    pub fn reset_cancel(&self) {
        self.cancel_flag.store(false, Ordering::Relaxed);
    }

    /// Applies `transaction` in its recorded direction.
    pub fn apply(&self, transaction: &Transaction) -> ReturnResult {
        if let Err(e) = transaction.validate() {
            warn!("Rejecting transaction {}: {}", transaction.id, e);
            return ReturnResult::BadArgument;
        }

        let outcome = match &transaction.details {
            TransactionDetails::Copy { items } => {
                self.each(items, |p| self.fs.copy(&p.source, &p.destination))
            }
            TransactionDetails::Move { items } => {
                self.each(items, |p| self.fs.move_item(&p.source, &p.destination))
            }
            TransactionDetails::Rename { from, to } => {
                self.each(&[(from, to)], |(from, to)| self.fs.move_item(from, to))
            }
            TransactionDetails::Delete { items } => self.each(items, |item| match &item.backup {
                Some(backup) => {
                    self.ensure_parent(backup)?;
                    self.fs.move_item(&item.original, backup)
                }
                None => self.fs.remove(&item.original),
            }),
            TransactionDetails::Restore { items } => self.each(items, |item| match &item.backup {
                Some(backup) => self.fs.move_item(backup, &item.original),
                None => Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("No backup recorded for {}", item.original.display()),
                )),
            }),
            TransactionDetails::NewFolder { paths } => self.each(paths, |p| self.fs.create_dir(p)),
        };

        match outcome {
            Ok(()) => ReturnResult::Success,
            Err(e) => {
                let result = ReturnResult::from_io_error(&e);
                warn!("{:?} {} stopped: {} ({:?})", transaction.op_type(), transaction.id, e, result);
                result
            }
        }
    }

    // Runs `op` over every item, stopping at the first error. Items already
    // processed stay processed.
    fn each<T>(&self, items: &[T], op: impl Fn(&T) -> io::Result<()>) -> io::Result<()> {
        for item in items {
            if self.cancel_flag.load(Ordering::Relaxed) {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled"));
            }
            op(item)?;
        }
        Ok(())
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !self.fs.exists(parent) => {
                self.fs.create_dir(parent)
            }
            _ => Ok(()),
        }
    }
}

impl StorageHistoryOperations for FsHistoryOperations {
    fn undo(&self, transaction: &Transaction) -> ReturnResult {
        if transaction.validate().is_err() {
            return ReturnResult::BadArgument;
        }
        info!("Undoing transaction: {:?} {}", transaction.op_type(), transaction.id);

        match transaction.inverse() {
            Some(inverse) => self.apply(&inverse),
            None => {
                // Permanent delete, nothing was kept to restore from
                warn!("Transaction {} has no inverse", transaction.id);
                ReturnResult::Failed
            }
        }
    }

    fn redo(&self, transaction: &Transaction) -> ReturnResult {
        info!("Redoing transaction: {:?} {}", transaction.op_type(), transaction.id);
        self.apply(transaction)
    }
}
