use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::ErrorKind;

/// Outcome of a reversal attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReturnResult {
    Success,
    Failed,
    Cancelled,
    /// Another reversal held the gate; nothing was attempted.
    InProgress,
    AccessUnauthorized,
    IntegrityCheckFailed,
    BadArgument,
    UnknownException,
}

/// Filesystem error kinds and the result each one reports. Unlisted kinds fall
/// through to `UnknownException`.
pub const ERROR_KIND_TABLE: &[(ErrorKind, ReturnResult)] = &[
    (ErrorKind::PermissionDenied, ReturnResult::AccessUnauthorized),
    (ErrorKind::NotFound, ReturnResult::IntegrityCheckFailed),
    (ErrorKind::AlreadyExists, ReturnResult::Failed),
    (ErrorKind::Interrupted, ReturnResult::Cancelled),
    (ErrorKind::InvalidInput, ReturnResult::BadArgument),
    (ErrorKind::WriteZero, ReturnResult::Failed),
    (ErrorKind::UnexpectedEof, ReturnResult::Failed),
];

impl ReturnResult {
    pub fn from_error_kind(kind: ErrorKind) -> Self {
        ERROR_KIND_TABLE
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, r)| *r)
            .unwrap_or(ReturnResult::UnknownException)
    }

    pub fn from_io_error(err: &std::io::Error) -> Self {
        Self::from_error_kind(err.kind())
    }

    pub fn is_success(self) -> bool {
        self == ReturnResult::Success
    }

    /// Outcomes the UI swallows without an error prompt.
    pub fn is_noop(self) -> bool {
        matches!(self, ReturnResult::InProgress | ReturnResult::Cancelled)
    }
}

impl fmt::Display for ReturnResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ReturnResult::Success => "Operation completed",
            ReturnResult::Failed => "The operation could not be completed",
            ReturnResult::Cancelled => "The operation was cancelled",
            ReturnResult::InProgress => "Another undo or redo is still running",
            ReturnResult::AccessUnauthorized => "Access to the item was denied",
            ReturnResult::IntegrityCheckFailed => "The item was moved or changed since the operation",
            ReturnResult::BadArgument => "The recorded operation is invalid",
            ReturnResult::UnknownException => "An unexpected error occurred",
        };
        f.write_str(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_mapping() {
        assert_eq!(ReturnResult::from_error_kind(ErrorKind::PermissionDenied), ReturnResult::AccessUnauthorized);
        assert_eq!(ReturnResult::from_error_kind(ErrorKind::NotFound), ReturnResult::IntegrityCheckFailed);
        assert_eq!(ReturnResult::from_error_kind(ErrorKind::AlreadyExists), ReturnResult::Failed);
        assert_eq!(ReturnResult::from_error_kind(ErrorKind::Interrupted), ReturnResult::Cancelled);
        assert_eq!(ReturnResult::from_error_kind(ErrorKind::InvalidInput), ReturnResult::BadArgument);
    }

    #[test]
    fn test_unmapped_kind_is_unknown() {
        assert_eq!(ReturnResult::from_error_kind(ErrorKind::Other), ReturnResult::UnknownException);
        assert_eq!(ReturnResult::from_error_kind(ErrorKind::TimedOut), ReturnResult::UnknownException);
    }

    #[test]
    fn test_table_has_no_duplicate_kinds() {
        for (i, (kind, _)) in ERROR_KIND_TABLE.iter().enumerate() {
            assert!(ERROR_KIND_TABLE[i + 1..].iter().all(|(k, _)| k != kind), "{:?} listed twice", kind);
        }
    }

    #[test]
    fn test_noop_tags() {
        assert!(ReturnResult::InProgress.is_noop());
        assert!(ReturnResult::Cancelled.is_noop());
        assert!(!ReturnResult::Failed.is_noop());
        assert!(!ReturnResult::Success.is_noop());
        assert!(ReturnResult::Success.is_success());
    }

    #[test]
    fn test_from_io_error() {
        let err = std::io::Error::new(ErrorKind::PermissionDenied, "nope");
        assert_eq!(ReturnResult::from_io_error(&err), ReturnResult::AccessUnauthorized);
    }
}
