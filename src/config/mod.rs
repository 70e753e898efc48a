//! @acp:module "Configuration"
//! @acp:summary "Scaffolder configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config
//!
//! Optional JSON configuration for the scaffolder. Every field has a default,
//! so an empty object (or no file at all) gives the stock behavior.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::descriptor::DescriptorSettings;
use crate::error::{Result, ScaffoldError};
use crate::rules::{Rule, RuleTable, Strictness};

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = ".fastymini.config.json";

/// Environment variable overriding the template root
pub const TEMPLATES_DIR_ENV: &str = "FASTYMINI_TEMPLATES_DIR";

/// Main scaffolder configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldConfig {
    /// Directory holding one subdirectory per template variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,

    /// Policy for rule conditions this build does not know
    #[serde(default)]
    pub unknown_conditions: Strictness,

    /// Policy for a failed dependency install
    #[serde(default)]
    pub install_failure: InstallFailurePolicy,

    /// Package descriptor transform settings
    #[serde(default)]
    pub descriptor: DescriptorSettings,

    /// Replacement rule table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,

    /// Package manager used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<PackageManager>,
}

impl ScaffoldConfig {
    /// Load config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ScaffoldError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ScaffoldError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Rule table in effect: the configured one, or the built-in table
    pub fn rule_table(&self) -> Result<RuleTable> {
        match &self.rules {
            Some(rules) => RuleTable::with_rules(rules.clone()),
            None => Ok(RuleTable::builtin()),
        }
    }

    /// Resolve the template root
    ///
    /// Order: explicit override, config, `FASTYMINI_TEMPLATES_DIR`, the
    /// templates bundled with the crate, then the user data directory.
    pub fn templates_dir(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(dir) = explicit {
            return dir.to_path_buf();
        }
        if let Some(dir) = &self.templates_dir {
            return dir.clone();
        }
        if let Some(dir) = std::env::var_os(TEMPLATES_DIR_ENV) {
            return PathBuf::from(dir);
        }
        let bundled = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
        if bundled.is_dir() {
            return bundled;
        }
        dirs::data_dir()
            .map(|d| d.join("create-fastymini").join("templates"))
            .unwrap_or(bundled)
    }
}

/// What to do when the package manager install step fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallFailurePolicy {
    /// Keep the project and warn
    #[default]
    Warn,
    /// Roll the project back
    Fail,
}

/// Supported package managers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    pub fn all() -> &'static [PackageManager] {
        &[PackageManager::Npm, PackageManager::Yarn, PackageManager::Pnpm]
    }

    /// Executable name
    pub fn command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
        }
    }

    /// Command that starts the dev server in a new project
    pub fn dev_command(&self) -> String {
        match self {
            PackageManager::Npm => "npm run dev".to_string(),
            other => format!("{} dev", other.command()),
        }
    }
}

impl std::str::FromStr for PackageManager {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "npm" => Ok(PackageManager::Npm),
            "yarn" => Ok(PackageManager::Yarn),
            "pnpm" => Ok(PackageManager::Pnpm),
            _ => Err(format!("Unknown package manager: {}. Use npm, yarn or pnpm", s)),
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.command())
    }
}
