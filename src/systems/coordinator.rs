use std::sync::Arc;
use log::{debug, info, warn};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

use crate::models::{HistoryConfig, HistoryManager, ReturnResult};
use crate::systems::history_ops::StorageHistoryOperations;

/// How the cursor reacts to an undo that neither succeeded nor was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPolicy {
    /// Step back past a record whose undo failed, so a broken record does not
    /// block everything older than it.
    pub advance_on_failed_undo: bool,
}

impl Default for CursorPolicy {
    fn default() -> Self {
        Self {
            advance_on_failed_undo: true,
        }
    }
}

impl CursorPolicy {
    fn should_step_back(&self, result: ReturnResult) -> bool {
        match result {
            ReturnResult::Cancelled => false,
            ReturnResult::Success => true,
            _ => self.advance_on_failed_undo,
        }
    }
}

/// Entry point for undo and redo.
///
/// One permit gates both directions. A request that finds the permit taken
/// returns `InProgress` at once instead of queueing. The engine runs on the
/// blocking pool together with the cursor update, holding the permit until
/// both are done, so dropping the returned future never leaves the stack half
/// updated.
#[derive(Clone)]
pub struct HistoryCoordinator {
    history: Arc<HistoryManager>,
    operations: Arc<dyn StorageHistoryOperations>,
    gate: Arc<Semaphore>,
    policy: CursorPolicy,
}

impl HistoryCoordinator {
    pub fn new(history: Arc<HistoryManager>, operations: Arc<dyn StorageHistoryOperations>) -> Self {
        Self::with_policy(history, operations, CursorPolicy::default())
    }

    pub fn with_policy(
        history: Arc<HistoryManager>,
        operations: Arc<dyn StorageHistoryOperations>,
        policy: CursorPolicy,
    ) -> Self {
        Self {
            history,
            operations,
            gate: Arc::new(Semaphore::new(1)),
            policy,
        }
    }

    pub fn from_config(
        history: Arc<HistoryManager>,
        operations: Arc<dyn StorageHistoryOperations>,
        config: &HistoryConfig,
    ) -> Self {
        let policy = CursorPolicy {
            advance_on_failed_undo: config.advance_on_failed_undo,
        };
        Self::with_policy(history, operations, policy)
    }

    pub fn history(&self) -> &Arc<HistoryManager> {
        &self.history
    }

    pub fn policy(&self) -> CursorPolicy {
        self.policy
    }

    /// True while an undo or redo holds the gate.
    pub fn is_busy(&self) -> bool {
        !self.gate.is_closed() && self.gate.available_permits() == 0
    }

    /// Shuts the gate for good. Later calls return `Cancelled`; a reversal
    /// already running finishes normally.
    pub fn close(&self) {
        info!("Closing history coordinator");
        self.gate.close();
    }

    fn acquire(&self) -> Result<OwnedSemaphorePermit, ReturnResult> {
        match self.gate.clone().try_acquire_owned() {
            Ok(permit) => Ok(permit),
            Err(TryAcquireError::NoPermits) => {
                debug!("Reversal rejected, another one is running");
                Err(ReturnResult::InProgress)
            }
            Err(TryAcquireError::Closed) => Err(ReturnResult::Cancelled),
        }
    }

    pub async fn try_undo(&self) -> ReturnResult {
        if !self.history.can_undo() {
            debug!("Nothing to undo");
            return ReturnResult::Cancelled;
        }
        let permit = match self.acquire() {
            Ok(p) => p,
            Err(result) => return result,
        };

        let history = self.history.clone();
        let operations = self.operations.clone();
        let policy = self.policy;

        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            // Re-read under the gate, the check above ran without it
            let Some(transaction) = history.current_record() else {
                return ReturnResult::Cancelled;
            };

            let result = operations.undo(&transaction);
            // The pipeline may have pushed while the engine ran
            if policy.should_step_back(result) && !history.step_back_if(&transaction.id) {
                warn!("Undone transaction {} left the history while running", transaction.id);
            }
            info!("Undo of {:?} {} finished: {:?}", transaction.op_type(), transaction.id, result);
            result
        });

        task.await.unwrap_or_else(|e| {
            warn!("Undo task failed: {}", e);
            ReturnResult::UnknownException
        })
    }

    pub async fn try_redo(&self) -> ReturnResult {
        if !self.history.can_redo() {
            debug!("Nothing to redo");
            return ReturnResult::Cancelled;
        }
        let permit = match self.acquire() {
            Ok(p) => p,
            Err(result) => return result,
        };

        let history = self.history.clone();
        let operations = self.operations.clone();

        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            // Cursor moves first so the slot being redone is already current
            let Some(transaction) = history.advance() else {
                return ReturnResult::Cancelled;
            };

            let result = operations.redo(&transaction);
            info!("Redo of {:?} {} finished: {:?}", transaction.op_type(), transaction.id, result);
            result
        });

        task.await.unwrap_or_else(|e| {
            warn!("Redo task failed: {}", e);
            ReturnResult::UnknownException
        })
    }
}
