pub mod fs;
pub mod history_ops;
pub mod coordinator;
pub mod file_ops;

pub use coordinator::{CursorPolicy, HistoryCoordinator};
pub use file_ops::FileOperationManager;
pub use fs::{FileSystem, LocalFileSystem};
pub use history_ops::{FsHistoryOperations, StorageHistoryOperations};
