use std::path::PathBuf;
use crate::models::CommandError;

/// Validates that a path is absolute.
/// Relative paths would resolve against whatever the process cwd happens to be
/// when an undo runs, which may not be where the operation happened.
pub fn validate_path(path_str: &str) -> Result<PathBuf, CommandError> {
    #[allow(unused_mut)]
    let mut path = PathBuf::from(path_str);
    if path_str.trim().is_empty() {
        return Err(CommandError::PathError("Path is empty".to_string()));
    }
    if !path.is_absolute() {
        return Err(CommandError::PathError(format!("Path must be absolute: {}", path_str)));
    }

    #[cfg(target_os = "windows")]
    {
        let mut needs_update = None;
        if let Some(file_name) = path.file_name() {
            let name_str = file_name.to_string_lossy();
            let trimmed_name = name_str.trim_end_matches(['.', ' ']);
            if (!trimmed_name.is_empty() || name_str.is_empty()) && trimmed_name != name_str {
                 needs_update = Some(trimmed_name.to_string());
            }
        }
        if let Some(new_name) = needs_update {
            path.set_file_name(new_name);
        }
    }

    Ok(path)
}

/// Validates a bare item name for a rename: no separators, not `.`/`..`.
pub fn validate_name(name: &str) -> Result<&str, CommandError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return Err(CommandError::PathError(format!("Invalid name: {:?}", name)));
    }
    if trimmed.contains(['/', '\\']) {
        return Err(CommandError::PathError(format!("Name must not contain separators: {}", name)));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn absolute(rel: &str) -> String {
        std::env::temp_dir().join(rel).to_string_lossy().to_string()
    }

    #[test]
    fn test_validate_path_valid_absolute() {
        assert!(validate_path(&absolute("Users/Test")).is_ok());
    }

    #[test]
    fn test_validate_path_invalid_relative() {
        let result = validate_path("relative/path");
        assert!(result.is_err());
        if let Err(CommandError::PathError(msg)) = result {
            assert!(msg.contains("Path must be absolute"));
        } else {
            panic!("Expected PathError");
        }
    }

    #[test]
    fn test_validate_path_empty() {
        assert!(matches!(validate_path("  "), Err(CommandError::PathError(_))));
    }

    #[test]
    fn test_validate_path_traversal() {
        assert!(validate_path(&absolute("foo/../bar")).is_ok());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name(" report.txt ").unwrap(), "report.txt");
        assert!(validate_name("..").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a\\b").is_err());
        assert!(validate_name("").is_err());
    }
}
