//! @acp:module "Template Variants"
//! @acp:summary "Starter project flavors shipped under the template root"
//! @acp:domain cli
//! @acp:layer model
//!
//! Named flavors of the starter project shipped under the template root.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScaffoldError};
use crate::rules::Database;

/// Supported template variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TemplateVariant {
    #[default]
    Default,
    MongoCrud,
    MongoCrudVitest,
}

impl TemplateVariant {
    pub fn all() -> &'static [TemplateVariant] {
        &[
            TemplateVariant::Default,
            TemplateVariant::MongoCrud,
            TemplateVariant::MongoCrudVitest,
        ]
    }

    /// Directory name under the template root
    pub fn dir_name(&self) -> &'static str {
        match self {
            TemplateVariant::Default => "default",
            TemplateVariant::MongoCrud => "mongo-crud",
            TemplateVariant::MongoCrudVitest => "mongo-crud-vitest",
        }
    }

    /// Human-readable name
    pub fn title(&self) -> &'static str {
        match self {
            TemplateVariant::Default => "Default",
            TemplateVariant::MongoCrud => "MongoDB",
            TemplateVariant::MongoCrudVitest => "MongoDB with Vitest",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TemplateVariant::Default => "Minimal Fastify server",
            TemplateVariant::MongoCrud => "A CRUD template with MongoDB integration through mongoose",
            TemplateVariant::MongoCrudVitest => {
                "A CRUD template with MongoDB through mongoose and Vitest integration"
            }
        }
    }

    /// Database integration the variant is built around
    pub fn database(&self) -> Option<Database> {
        match self {
            TemplateVariant::Default => None,
            TemplateVariant::MongoCrud | TemplateVariant::MongoCrudVitest => {
                Some(Database::Mongoose)
            }
        }
    }

    /// Variant directory under `templates_root`, which must exist
    pub fn locate(&self, templates_root: &Path) -> Result<PathBuf> {
        let dir = templates_root.join(self.dir_name());
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(ScaffoldError::TemplateNotFound(dir))
        }
    }
}

impl std::str::FromStr for TemplateVariant {
    type Err = ScaffoldError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        TemplateVariant::all()
            .iter()
            .copied()
            .find(|v| v.dir_name() == s.to_lowercase())
            .ok_or_else(|| ScaffoldError::UnknownTemplate {
                name: s.to_string(),
                available: TemplateVariant::all()
                    .iter()
                    .map(|v| v.dir_name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl fmt::Display for TemplateVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}
