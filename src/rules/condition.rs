//! @acp:module "Rule Conditions"
//! @acp:summary "Condition tags and feature snapshot evaluation"
//! @acp:domain cli
//! @acp:layer logic
//!
//! Condition tags and their evaluation against a resolved feature snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScaffoldError};

/// Condition a rule depends on
///
/// Tags that are not known to this build are preserved as `Unknown` so that
/// rule tables written by newer tooling still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    Always,
    Prettier,
    Eslint,
    Editorconfig,
    Unknown(String),
}

impl Condition {
    pub fn as_str(&self) -> &str {
        match self {
            Condition::Always => "always",
            Condition::Prettier => "prettier",
            Condition::Eslint => "eslint",
            Condition::Editorconfig => "editorconfig",
            Condition::Unknown(tag) => tag,
        }
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Condition::Always)
    }
}

impl From<String> for Condition {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "always" => Condition::Always,
            "prettier" => Condition::Prettier,
            "eslint" => Condition::Eslint,
            "editorconfig" => Condition::Editorconfig,
            _ => Condition::Unknown(tag),
        }
    }
}

impl From<Condition> for String {
    fn from(condition: Condition) -> Self {
        condition.as_str().to_string()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database integration bundled with a template variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Mongoose,
}

impl Database {
    /// Package name injected into the descriptor
    pub fn package_name(&self) -> &'static str {
        match self {
            Database::Mongoose => "mongoose",
        }
    }
}

/// Resolved feature toggles for one project creation
///
/// Built once every option has been answered; never mutated afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureSnapshot {
    pub prettier: bool,
    pub eslint: bool,
    pub editorconfig: bool,
    pub database: Option<Database>,
}

impl FeatureSnapshot {
    /// Value of a feature tag, `None` for tags this snapshot has no entry for
    pub fn feature(&self, condition: &Condition) -> Option<bool> {
        match condition {
            Condition::Always => Some(true),
            Condition::Prettier => Some(self.prettier),
            Condition::Eslint => Some(self.eslint),
            Condition::Editorconfig => Some(self.editorconfig),
            Condition::Unknown(_) => None,
        }
    }
}

/// How to treat condition tags the evaluator does not know
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Unknown tags evaluate to true
    #[default]
    Permissive,
    /// Unknown tags are an error
    Strict,
}

/// Evaluate a condition, failing open on unknown tags
pub fn evaluate(condition: &Condition, snapshot: &FeatureSnapshot) -> bool {
    snapshot.feature(condition).unwrap_or(true)
}

/// Evaluate a condition under an explicit unknown-tag policy
pub fn evaluate_with_policy(
    condition: &Condition,
    snapshot: &FeatureSnapshot,
    policy: Strictness,
) -> Result<bool> {
    match snapshot.feature(condition) {
        Some(value) => Ok(value),
        None => match policy {
            Strictness::Permissive => {
                tracing::warn!("Unknown rule condition '{}', treating as active", condition);
                Ok(true)
            }
            Strictness::Strict => Err(ScaffoldError::UnknownCondition(condition.to_string())),
        },
    }
}
