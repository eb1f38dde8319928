use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{CommandError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionType {
    Copy,
    Move,
    Rename,
    Delete,
    NewFolder,
    Restore,
}

/// One source/destination pair of a copy or move.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathPair {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl PathPair {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    fn swapped(&self) -> Self {
        Self {
            source: self.destination.clone(),
            destination: self.source.clone(),
        }
    }
}

/// An item removed from its original location. `backup` is where it was staged,
/// or `None` when the removal was permanent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StagedItem {
    pub original: PathBuf,
    pub backup: Option<PathBuf>,
}

impl StagedItem {
    pub fn staged(original: impl Into<PathBuf>, backup: impl Into<PathBuf>) -> Self {
        Self {
            original: original.into(),
            backup: Some(backup.into()),
        }
    }

    pub fn permanent(original: impl Into<PathBuf>) -> Self {
        Self {
            original: original.into(),
            backup: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TransactionDetails {
    Copy { items: Vec<PathPair> },
    Move { items: Vec<PathPair> },
    Rename { from: PathBuf, to: PathBuf },
    Delete { items: Vec<StagedItem> },
    NewFolder { paths: Vec<PathBuf> },
    Restore { items: Vec<StagedItem> },
}

impl TransactionDetails {
    pub fn op_type(&self) -> TransactionType {
        match self {
            TransactionDetails::Copy { .. } => TransactionType::Copy,
            TransactionDetails::Move { .. } => TransactionType::Move,
            TransactionDetails::Rename { .. } => TransactionType::Rename,
            TransactionDetails::Delete { .. } => TransactionType::Delete,
            TransactionDetails::NewFolder { .. } => TransactionType::NewFolder,
            TransactionDetails::Restore { .. } => TransactionType::Restore,
        }
    }
}

/// A committed filesystem mutation, complete enough to reverse it.
///
/// Records are never edited in place. Reversal goes through [`Transaction::inverse`],
/// which yields a fresh record, so the original stays available for redo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    pub timestamp: i64,
    pub details: TransactionDetails,
}

impl Transaction {
    pub fn new(details: TransactionDetails) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            details,
        }
    }

    pub fn op_type(&self) -> TransactionType {
        self.details.op_type()
    }

    /// Builds the record that undoes this one.
    ///
    /// Returns `None` for deletes that were not staged anywhere: there is nothing
    /// left to bring back.
    pub fn inverse(&self) -> Option<Transaction> {
        let details = match &self.details {
            TransactionDetails::Copy { items } => TransactionDetails::Delete {
                items: items
                    .iter()
                    .map(|p| StagedItem::permanent(p.destination.clone()))
                    .collect(),
            },
            TransactionDetails::Move { items } => TransactionDetails::Move {
                items: items.iter().map(PathPair::swapped).collect(),
            },
            TransactionDetails::Rename { from, to } => TransactionDetails::Rename {
                from: to.clone(),
                to: from.clone(),
            },
            TransactionDetails::Delete { items } => {
                if items.iter().any(|i| i.backup.is_none()) {
                    return None;
                }
                TransactionDetails::Restore {
                    items: items.clone(),
                }
            }
            TransactionDetails::Restore { items } => TransactionDetails::Delete {
                items: items.clone(),
            },
            TransactionDetails::NewFolder { paths } => TransactionDetails::Delete {
                items: paths.iter().cloned().map(StagedItem::permanent).collect(),
            },
        };
        Some(Transaction::new(details))
    }

    /// Rejects records with no items or blank paths.
    pub fn validate(&self) -> Result<()> {
        let paths: Vec<&Path> = match &self.details {
            TransactionDetails::Copy { items } | TransactionDetails::Move { items } => items
                .iter()
                .flat_map(|p| [p.source.as_path(), p.destination.as_path()])
                .collect(),
            TransactionDetails::Rename { from, to } => vec![from.as_path(), to.as_path()],
            TransactionDetails::Delete { items } | TransactionDetails::Restore { items } => items
                .iter()
                .flat_map(|i| std::iter::once(i.original.as_path()).chain(i.backup.as_deref()))
                .collect(),
            TransactionDetails::NewFolder { paths } => paths.iter().map(PathBuf::as_path).collect(),
        };

        if paths.is_empty() {
            return Err(CommandError::HistoryError(format!(
                "{:?} record {} has no items",
                self.op_type(),
                self.id
            )));
        }
        if paths.iter().any(|p| p.as_os_str().is_empty()) {
            return Err(CommandError::PathError(format!(
                "{:?} record {} contains an empty path",
                self.op_type(),
                self.id
            )));
        }
        Ok(())
    }
}
