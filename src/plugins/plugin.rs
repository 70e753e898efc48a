//! @acp:module "Plugin Trait"
//! @acp:summary "Trait for optional subtree integrations"
//! @acp:domain cli
//! @acp:layer model
//!
//! Trait definition for optional integrations scoped to their own subtree.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fsutil;
use crate::rules::FeatureSnapshot;

/// What a plugin did to the project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginAction {
    /// Template moved to its final name
    Enabled,
    /// Enabled, but the template was not in this variant
    NotShipped,
    /// Template and final file removed
    Disabled,
}

/// Result of applying a single plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOutcome {
    pub plugin: &'static str,
    pub action: PluginAction,
    pub path: PathBuf,
}

/// Optional integration, enabled or disabled by file presence
pub trait Plugin: Send + Sync {
    /// Plugin identifier
    fn name(&self) -> &'static str;

    /// Subdirectory of the project the plugin owns
    fn subdir(&self) -> &'static str;

    /// Template-marked file name inside `subdir`
    fn template_file(&self) -> &'static str;

    /// Final file name inside `subdir`
    fn target_file(&self) -> &'static str;

    /// Whether the snapshot selects this plugin
    fn is_enabled(&self, snapshot: &FeatureSnapshot) -> bool;

    fn template_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(self.subdir()).join(self.template_file())
    }

    fn target_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(self.subdir()).join(self.target_file())
    }

    /// Rename on enable, delete both files on disable
    fn apply(&self, project_root: &Path, enabled: bool) -> Result<PluginOutcome> {
        let template = self.template_path(project_root);
        let target = self.target_path(project_root);

        let action = if enabled {
            if template.exists() {
                fsutil::move_file(&template, &target)?;
                PluginAction::Enabled
            } else {
                PluginAction::NotShipped
            }
        } else {
            fsutil::remove_path(&template)?;
            fsutil::remove_path(&target)?;
            PluginAction::Disabled
        };

        Ok(PluginOutcome {
            plugin: self.name(),
            action,
            path: target,
        })
    }
}
