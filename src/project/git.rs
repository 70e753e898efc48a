//! @acp:module "Git Init"
//! @acp:summary "Initialize the project repository"
//! @acp:domain cli
//! @acp:layer io

use std::path::Path;

use git2::{Repository, RepositoryInitOptions};

use crate::error::Result;

/// Branch the new repository starts on
pub const DEFAULT_BRANCH: &str = "main";

/// Initialize an empty git repository at `path`
pub fn init_repository(path: &Path) -> Result<()> {
    tracing::info!("Initializing git repository at: {}", path.display());

    let mut options = RepositoryInitOptions::new();
    options.initial_head(DEFAULT_BRANCH);
    Repository::init_opts(path, &options)?;

    Ok(())
}
