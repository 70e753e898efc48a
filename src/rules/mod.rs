//! @acp:module "Rule Table"
//! @acp:summary "Declarative file transformation rules"
//! @acp:domain cli
//! @acp:layer model
//!
//! Declarative list of file transformation rules applied to a freshly copied
//! template tree. A table is constructed explicitly and handed to the engine;
//! there is no process-wide rule state.
//!
//! ## Built-in rules
//!
//! - Prettier (`.prettierrc.json`, `.prettierignore`)
//! - ESLint (`eslint.config.mts`)
//! - Git (`.gitignore`, `.gitattributes`)
//! - EditorConfig (`.editorconfig`)
//! - Environment (`.env.template`)

pub mod condition;
pub mod mapping;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use condition::{
    evaluate, evaluate_with_policy, Condition, Database, FeatureSnapshot, Strictness,
};
pub use mapping::{template_name, TemplateMapping, TEMPLATE_MARKER};

use crate::error::{IoResultExt, Result, ScaffoldError};

/// What to do with a rule's files when its condition is false
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InactiveAction {
    /// Delete both the source-named and target-named files
    Remove,
    /// Leave the file under its source name
    #[default]
    Skip,
}

/// One file's conditional inclusion, renaming or removal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Path relative to the project root before materialization
    pub source: String,
    /// Path relative to the project root after materialization
    pub target: String,
    pub condition: Condition,
    #[serde(default)]
    pub action_on_inactive: InactiveAction,
}

impl Rule {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        condition: Condition,
        action_on_inactive: InactiveAction,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            condition,
            action_on_inactive,
        }
    }

    /// Rule whose source is the template-marked form of `canonical`
    pub fn templated(canonical: &str, condition: Condition, action: InactiveAction) -> Self {
        Self::new(template_name(canonical), canonical, condition, action)
    }

    /// Rule for a file shipped under its final name
    pub fn fixed(name: &str) -> Self {
        Self::new(name, name, Condition::Always, InactiveAction::Skip)
    }

    pub fn renames(&self) -> bool {
        self.source != self.target
    }
}

/// Validated, immutable set of rules plus the files handled outside the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<Rule>,
    /// Canonical names of templated files handled by dedicated transforms
    manually_managed: Vec<String>,
}

impl RuleTable {
    /// Build a table, normalizing paths and rejecting duplicate targets
    ///
    /// Rule paths must stay inside the project root: absolute paths and `..`
    /// segments are rejected, `.` and empty segments are dropped.
    pub fn new(rules: Vec<Rule>, manually_managed: Vec<String>) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                Ok(Rule {
                    source: normalize_rule_path(&rule.source)?,
                    target: normalize_rule_path(&rule.target)?,
                    ..rule
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.target.as_str()) {
                return Err(ScaffoldError::DuplicateTarget(rule.target.clone()));
            }
        }
        Ok(Self {
            rules,
            manually_managed,
        })
    }

    /// The rule table shipped with the templates
    pub fn builtin() -> Self {
        let rules = vec![
            Rule::templated(".prettierrc.json", Condition::Prettier, InactiveAction::Remove),
            Rule::templated(".prettierignore", Condition::Prettier, InactiveAction::Remove),
            Rule::templated("eslint.config.mts", Condition::Eslint, InactiveAction::Remove),
            Rule::templated(".gitignore", Condition::Always, InactiveAction::Skip),
            Rule::fixed(".gitattributes"),
            Rule::templated(".editorconfig", Condition::Editorconfig, InactiveAction::Remove),
            Rule::fixed(".env.template"),
        ];
        let manually_managed = vec!["package.json".to_string(), "tsconfig.json".to_string()];

        Self {
            rules,
            manually_managed,
        }
    }

    /// Keep the built-in manually managed files but replace the rules
    pub fn with_rules(rules: Vec<Rule>) -> Result<Self> {
        Self::new(rules, Self::builtin().manually_managed)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn manually_managed(&self) -> &[String] {
        &self.manually_managed
    }

    /// Template-marked names of the manually managed files
    pub fn manually_managed_templates(&self) -> Vec<String> {
        self.manually_managed.iter().map(|c| template_name(c)).collect()
    }

    /// Every source file name this table knows about
    pub fn known_sources(&self) -> Vec<String> {
        self.rules
            .iter()
            .map(|r| r.source.clone())
            .chain(self.manually_managed_templates())
            .collect()
    }

    /// Parse a JSON rule array
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Vec<Rule> = serde_json::from_str(json)?;
        Self::with_rules(rules)
    }

    /// Load a JSON rule array from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).with_path("read", path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rules)?)
    }
}

/// Relative, `/`-separated form of a rule path confined to the project root
fn normalize_rule_path(path: &str) -> Result<String> {
    let invalid = |reason| ScaffoldError::InvalidRulePath {
        path: path.to_string(),
        reason,
    };

    if path.starts_with('/') || path.starts_with('\\') || Path::new(path).is_absolute() {
        return Err(invalid("absolute paths are not allowed"));
    }

    let mut segments = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(invalid("parent segments are not allowed")),
            s if s.contains(':') => return Err(invalid("drive prefixes are not allowed")),
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        return Err(invalid("path is empty"));
    }
    Ok(segments.join("/"))
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}
