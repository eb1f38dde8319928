use std::sync::Mutex;
use serde::{Deserialize, Serialize};
use crate::models::transaction::Transaction;

pub const DEFAULT_CAPACITY: usize = 100;

/// Ordered history plus the cursor. `cursor` is the index of the last applied
/// record, or `-1` when nothing is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryState {
    pub records: Vec<Transaction>,
    pub cursor: isize,
    pub capacity: usize,
}

impl Default for HistoryState {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl HistoryState {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            cursor: -1,
            capacity: capacity.max(1),
        }
    }

    /// Appends `transaction` and returns every record that fell out of the
    /// history: the discarded redo tail and anything evicted past capacity.
    pub fn push(&mut self, transaction: Transaction) -> Vec<Transaction> {
        // New action drops the redo tail
        let mut dropped = self.records.split_off((self.cursor + 1) as usize);
        self.records.push(transaction);

        if self.records.len() > self.capacity {
            let overflow = self.records.len() - self.capacity;
            dropped.extend(self.records.drain(..overflow));
        }
        self.cursor = self.records.len() as isize - 1;
        dropped
    }

    pub fn can_undo(&self) -> bool {
        self.cursor >= 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.records.len() as isize - 1
    }

    pub fn current_record(&self) -> Option<&Transaction> {
        if !self.can_undo() {
            return None;
        }
        self.records.get(self.cursor as usize)
    }

    pub fn decrease_cursor(&mut self) {
        if self.cursor >= 0 {
            self.cursor -= 1;
        }
    }

    pub fn increase_cursor(&mut self) {
        if self.can_redo() {
            self.cursor += 1;
        }
    }

    /// Settles a finished undo of record `id`.
    ///
    /// If `id` is still current the cursor steps back. If newer records were
    /// pushed meanwhile, the undone record is taken out of the applied range
    /// instead, so the cursor keeps pointing at the newest applied record.
    /// Returns false when `id` is no longer in the history.
    pub fn step_back_if(&mut self, id: &str) -> bool {
        if self.current_record().map(|t| t.id.as_str()) == Some(id) {
            self.cursor -= 1;
            return true;
        }
        let applied = (self.cursor + 1).max(0) as usize;
        match self.records[..applied].iter().position(|t| t.id == id) {
            Some(index) => {
                self.records.remove(index);
                self.cursor -= 1;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.cursor = -1;
    }
}

pub struct HistoryManager(pub Mutex<HistoryState>);

impl Default for HistoryManager {
    fn default() -> Self {
        Self(Mutex::new(HistoryState::default()))
    }
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Mutex::new(HistoryState::with_capacity(capacity)))
    }

    /// Records a committed operation. Returns the records that dropped out of
    /// the history so the caller can release what they hold.
    pub fn push(&self, transaction: Transaction) -> Vec<Transaction> {
        match self.0.lock() {
            Ok(mut state) => state.push(transaction),
            Err(_) => Vec::new(),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.0.lock().map(|s| s.can_undo()).unwrap_or(false)
    }

    pub fn can_redo(&self) -> bool {
        self.0.lock().map(|s| s.can_redo()).unwrap_or(false)
    }

    pub fn current_record(&self) -> Option<Transaction> {
        self.0.lock().ok().and_then(|s| s.current_record().cloned())
    }

    pub fn cursor(&self) -> isize {
        self.0.lock().map(|s| s.cursor).unwrap_or(-1)
    }

    pub fn decrease_cursor(&self) {
        if let Ok(mut state) = self.0.lock() {
            state.decrease_cursor();
        }
    }

    pub fn increase_cursor(&self) {
        if let Ok(mut state) = self.0.lock() {
            state.increase_cursor();
        }
    }

    pub fn step_back_if(&self, id: &str) -> bool {
        self.0.lock().map(|mut s| s.step_back_if(id)).unwrap_or(false)
    }

    /// Advances the cursor and hands back the record it now points at, in one lock.
    pub fn advance(&self) -> Option<Transaction> {
        let mut state = self.0.lock().ok()?;
        if !state.can_redo() {
            return None;
        }
        state.increase_cursor();
        state.current_record().cloned()
    }

    pub fn get_state(&self) -> HistoryState {
        self.0.lock().map(|s| (*s).clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut state) = self.0.lock() {
            state.clear();
        }
    }
}
