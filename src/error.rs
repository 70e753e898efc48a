//! @acp:module "Error Types"
//! @acp:summary "Library errors for materialization and project creation"
//! @acp:domain cli
//! @acp:layer types
//!
//! Library-level errors for template materialization and project creation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the crate's [`ScaffoldError`]
pub type Result<T> = std::result::Result<T, ScaffoldError>;

/// Errors raised while materializing a project
#[derive(Error, Debug)]
pub enum ScaffoldError {
    /// Filesystem operation failed on a specific path
    #[error("{action} failed for {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template variant directory does not exist
    #[error("Template not found at {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// Unknown template variant name
    #[error("Unknown template: {name}. Available templates: {available}")]
    UnknownTemplate { name: String, available: String },

    /// Target project directory already exists
    #[error("Directory {} already exists", .0.display())]
    ProjectExists(PathBuf),

    /// Template package descriptor is missing
    #[error("Package descriptor template not found at {}", .0.display())]
    DescriptorMissing(PathBuf),

    /// Template package descriptor could not be parsed
    #[error("Malformed package descriptor {}: {source}", path.display())]
    DescriptorMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Two rules in one table produce the same target
    #[error("Duplicate rule target: {0}")]
    DuplicateTarget(String),

    /// Rule path is absolute or leaves the project root
    #[error("Invalid rule path {path}: {reason}")]
    InvalidRulePath { path: String, reason: &'static str },

    /// Rule condition tag not recognized under strict evaluation
    #[error("Unknown rule condition: {0}")]
    UnknownCondition(String),

    /// Configuration file could not be loaded
    #[error("Invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// Git repository initialization failed
    #[error("Git initialization failed: {0}")]
    Git(#[from] git2::Error),

    /// External command exited unsuccessfully
    #[error("Command `{command}` failed: {message}")]
    Command { command: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl ScaffoldError {
    /// Wrap an I/O error with the action and path it happened on
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScaffoldError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Extension for attaching path context to `std::io::Result`
pub trait IoResultExt<T> {
    fn with_path(self, action: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, action: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| ScaffoldError::io(action, path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_message_includes_path() {
        let err = ScaffoldError::io(
            "rename",
            "/tmp/x-template.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("rename failed"));
        assert!(msg.contains("x-template.json"));
    }

    #[test]
    fn test_with_path_maps_error() {
        let res: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        let err = res.with_path("remove", "a.txt").unwrap_err();
        assert!(matches!(err, ScaffoldError::Io { action: "remove", .. }));
    }
}
