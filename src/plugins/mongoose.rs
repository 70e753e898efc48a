//! @acp:module "Mongoose Plugin"
//! @acp:summary "Mongoose ORM config for database-backed variants"
//! @acp:domain cli
//! @acp:layer feature

use crate::plugins::plugin::Plugin;
use crate::rules::{Database, FeatureSnapshot};

/// Mongoose plugin - manages plugins/mongoose.config.ts
pub struct MongoosePlugin;

impl Plugin for MongoosePlugin {
    fn name(&self) -> &'static str {
        "mongoose"
    }

    fn subdir(&self) -> &'static str {
        "plugins"
    }

    fn template_file(&self) -> &'static str {
        "mongoose.config-template.ts"
    }

    fn target_file(&self) -> &'static str {
        "mongoose.config.ts"
    }

    fn is_enabled(&self, snapshot: &FeatureSnapshot) -> bool {
        snapshot.database == Some(Database::Mongoose)
    }
}
