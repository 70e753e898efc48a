//! @acp:module "Filesystem Helpers"
//! @acp:summary "Copy, move and remove with path-aware errors"
//! @acp:domain cli
//! @acp:layer io
//!
//! Small wrappers over `std::fs` that attach path context to errors.

use std::path::Path;

use walkdir::WalkDir;

use crate::error::{IoResultExt, Result, ScaffoldError};

/// Copy the contents of `src` into `dst`, creating `dst` if needed
///
/// Existing files in `dst` are overwritten. Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    std::fs::create_dir_all(dst).with_path("create directory", dst)?;

    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            ScaffoldError::io("walk", path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| ScaffoldError::Other(e.to_string()))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).with_path("create directory", &target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).with_path("create directory", parent)?;
            }
            std::fs::copy(entry.path(), &target).with_path("copy", entry.path())?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Move a file, replacing anything already at `to`
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).with_path("create directory", parent)?;
        }
    }
    if to.is_dir() {
        std::fs::remove_dir_all(to).with_path("remove", to)?;
    }
    if std::fs::rename(from, to).is_err() {
        // Cross-device moves cannot be renamed in place
        std::fs::copy(from, to).with_path("copy", from)?;
        std::fs::remove_file(from).with_path("remove", from)?;
    }
    Ok(())
}

/// Remove a file or directory if it exists, returning whether anything was removed
pub fn remove_path(path: &Path) -> Result<bool> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {
            std::fs::remove_dir_all(path).with_path("remove", path)?;
            Ok(true)
        }
        Ok(_) => {
            std::fs::remove_file(path).with_path("remove", path)?;
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ScaffoldError::io("stat", path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_tree_nested() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir_all(src.join("a/b")).unwrap();
        std::fs::create_dir_all(src.join("empty")).unwrap();
        std::fs::write(src.join("top.txt"), "top").unwrap();
        std::fs::write(src.join("a/b/deep.txt"), "deep").unwrap();

        let dst = temp.path().join("dst");
        let copied = copy_tree(&src, &dst).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(std::fs::read_to_string(dst.join("a/b/deep.txt")).unwrap(), "deep");
        assert!(dst.join("empty").is_dir());
    }

    #[test]
    fn test_move_file_overwrites() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("x-template.json");
        let to = temp.path().join("x.json");
        std::fs::write(&from, "new").unwrap();
        std::fs::write(&to, "old").unwrap();

        move_file(&from, &to).unwrap();

        assert!(!from.exists());
        assert_eq!(std::fs::read_to_string(&to).unwrap(), "new");
    }

    #[test]
    fn test_remove_path_missing_is_ok() {
        let temp = TempDir::new().unwrap();
        assert!(!remove_path(&temp.path().join("nope")).unwrap());
    }
}
