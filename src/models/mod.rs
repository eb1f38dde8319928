pub mod error;
pub mod transaction;
pub mod history;
pub mod result;

pub use error::CommandError;
pub type Result<T> = std::result::Result<T, CommandError>;

pub use config::{HistoryConfig, ConfigManager};
pub use transaction::{Transaction, TransactionType, TransactionDetails, PathPair, StagedItem};
pub use history::{HistoryManager, HistoryState};
pub use result::ReturnResult;

pub mod config;
