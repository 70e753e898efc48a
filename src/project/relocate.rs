//! @acp:module "Secondary Config Relocation"
//! @acp:summary "Move tsconfig into place and guarantee a .gitignore"
//! @acp:domain cli
//! @acp:layer logic
//!
//! Steps that run after plugins: moving the TypeScript config into place and
//! making sure the project ends up with a `.gitignore`.

use std::path::Path;

use crate::error::Result;
use crate::fsutil;
use crate::rules::template_name;

const TSCONFIG_FILE: &str = "tsconfig.json";
const GITIGNORE_FILE: &str = ".gitignore";

const DEFAULT_GITIGNORE: &str = "\
.yarn/*
!.yarn/patches
!.yarn/plugins
!.yarn/releases
!.yarn/sdks
!.yarn/versions

node_modules

#!.yarn/cache
.pnp.*
/dist

*.env

# macOS
.DS_Store
";

/// Move `tsconfig-template.json` to `tsconfig.json` when the variant ships one
pub fn relocate_tsconfig(project_root: &Path) -> Result<bool> {
    let template = project_root.join(template_name(TSCONFIG_FILE));
    if !template.exists() {
        return Ok(false);
    }
    fsutil::move_file(&template, &project_root.join(TSCONFIG_FILE))?;
    tracing::debug!("Relocated {}", TSCONFIG_FILE);
    Ok(true)
}

/// Write a default `.gitignore` unless a regular file is already there
///
/// Returns whether the default was written. Failures are logged, not raised.
pub fn ensure_gitignore(project_root: &Path) -> bool {
    let path = project_root.join(GITIGNORE_FILE);
    if path.is_file() {
        return false;
    }

    let written = fsutil::remove_path(&path).and_then(|_| {
        std::fs::write(&path, DEFAULT_GITIGNORE)
            .map_err(|e| crate::error::ScaffoldError::io("write", &path, e))
    });
    match written {
        Ok(()) => {
            tracing::debug!("Wrote default {}", GITIGNORE_FILE);
            true
        }
        Err(e) => {
            tracing::warn!("Failed to ensure {}: {}", GITIGNORE_FILE, e);
            false
        }
    }
}
