//! @acp:module "Templatize Command"
//! @acp:summary "Rename config files between live and template-marked names"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Rename a working tree's config files to their template-marked names and
//! back, from the same mapping the rule table derives.

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use crate::config::ScaffoldConfig;
use crate::rules::mapping::Direction;
use crate::rules::TemplateMapping;

/// Options for the templatize and restore commands
#[derive(Debug, Clone)]
pub struct RenameOptions {
    /// Tree to rename in place
    pub root: PathBuf,
}

/// Execute the templatize command
pub fn execute_templatize(options: RenameOptions, config: &ScaffoldConfig) -> Result<()> {
    rename(options, config, Direction::Templatize)
}

/// Execute the restore command
pub fn execute_restore(options: RenameOptions, config: &ScaffoldConfig) -> Result<()> {
    rename(options, config, Direction::Restore)
}

fn rename(options: RenameOptions, config: &ScaffoldConfig, direction: Direction) -> Result<()> {
    if !options.root.is_dir() {
        anyhow::bail!("{} is not a directory", options.root.display());
    }

    let mapping = TemplateMapping::from_table(&config.rule_table()?)?;
    let renamed = mapping
        .rename_tree(&options.root, direction)
        .with_context(|| format!("Failed to rename files under {}", options.root.display()))?;

    for entry in &renamed {
        println!(
            "  {} {} {}",
            entry.from.display(),
            style("→").dim(),
            entry.to.display()
        );
    }
    println!("{} Renamed {} file(s)", style("✓").green(), renamed.len());
    Ok(())
}
