//! @acp:module "Plugin Transforms"
//! @acp:summary "Registry of optional subtree integrations"
//! @acp:domain cli
//! @acp:layer service
//!
//! Optional integrations that ship a templated file in their own subtree.
//! Each plugin follows the enable-rename / disable-delete pattern of a single
//! rule but stays a separate extension point so an integration can grow to
//! multi-file transforms.
//!
//! ## Built-in plugins
//!
//! - Mongoose (`plugins/mongoose.config.ts`)

pub mod mongoose;
pub mod plugin;

use std::path::Path;

pub use mongoose::MongoosePlugin;
pub use plugin::{Plugin, PluginAction, PluginOutcome};

use crate::error::Result;
use crate::rules::FeatureSnapshot;

/// Ordered set of plugins applied after rule materialization
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginRegistry {
    /// Registry with every built-in plugin
    pub fn builtin() -> Self {
        Self {
            plugins: vec![Box::new(MongoosePlugin)],
        }
    }

    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Plugin> {
        self.plugins.iter().map(|p| p.as_ref())
    }

    /// Template paths (relative, `/`-separated) owned by plugins
    pub fn template_files(&self) -> Vec<String> {
        self.plugins
            .iter()
            .map(|p| format!("{}/{}", p.subdir(), p.template_file()))
            .collect()
    }

    /// Apply every plugin according to the snapshot
    pub fn apply_all(
        &self,
        project_root: &Path,
        snapshot: &FeatureSnapshot,
    ) -> Result<Vec<PluginOutcome>> {
        self.plugins
            .iter()
            .map(|plugin| {
                let outcome = plugin.apply(project_root, plugin.is_enabled(snapshot))?;
                tracing::debug!("Plugin {}: {:?}", outcome.plugin, outcome.action);
                Ok(outcome)
            })
            .collect()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
