pub mod models;
pub mod utils;
pub mod systems;

use std::sync::Arc;
use log::warn;

use models::{HistoryConfig, HistoryManager};
use systems::{FileOperationManager, FileSystem, FsHistoryOperations, HistoryCoordinator, LocalFileSystem};
use utils::staging::StagingArea;

pub use models::{ReturnResult, Transaction, TransactionDetails};

/// Installs `env_logger` with an `info` default. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}

/// Everything one application session needs, wired from a config.
///
/// The history, the engine and the gate are owned here and handed to their
/// users explicitly.
pub struct HistoryContext {
    pub history: Arc<HistoryManager>,
    pub operations: Arc<FsHistoryOperations>,
    pub coordinator: HistoryCoordinator,
    pub file_ops: FileOperationManager,
}

impl HistoryContext {
    pub fn new(config: &HistoryConfig) -> Self {
        Self::with_filesystem(config, Arc::new(LocalFileSystem::new()))
    }

    pub fn with_filesystem(config: &HistoryConfig, fs: Arc<dyn FileSystem>) -> Self {
        let history = Arc::new(HistoryManager::with_capacity(config.capacity));
        let operations = Arc::new(FsHistoryOperations::new(fs.clone()));
        let coordinator = HistoryCoordinator::from_config(history.clone(), operations.clone(), config);
        let file_ops = FileOperationManager::new(fs, history.clone(), StagingArea::new(config.staging_root()));

        Self {
            history,
            operations,
            coordinator,
            file_ops,
        }
    }

    pub async fn undo(&self) -> ReturnResult {
        self.coordinator.try_undo().await
    }

    pub async fn redo(&self) -> ReturnResult {
        self.coordinator.try_redo().await
    }
}

impl Drop for HistoryContext {
    // History does not outlive the session, so neither do its backups
    fn drop(&mut self) {
        self.coordinator.close();
        if let Err(e) = self.file_ops.staging().purge() {
            warn!("Failed to purge staging area: {}", e);
        }
    }
}
