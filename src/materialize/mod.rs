//! @acp:module "Materialization Engine"
//! @acp:summary "Apply a rule table to a project directory"
//! @acp:domain cli
//! @acp:layer service
//!
//! Resolves every rule of a [`RuleTable`] against a [`FeatureSnapshot`] and
//! applies the resulting rename or removal inside a project directory.
//!
//! Rules are independent and processed sequentially. Running the engine a
//! second time on an already materialized tree changes nothing.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fsutil;
use crate::rules::{evaluate_with_policy, FeatureSnapshot, InactiveAction, Rule, RuleTable, Strictness};

/// What happened to a single rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleAction {
    /// Source moved to target
    Renamed,
    /// Source already carries its final name
    Kept,
    /// Source (and target, if present) deleted
    Removed,
    /// Condition false, files left under their source name
    LeftUntouched,
    /// Source absent but target already in place
    AlreadyMaterialized,
    /// Source absent for a conditional rule
    NotApplicable,
    /// Source absent for an `always` rule
    MissingRequired,
}

/// Outcome for one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub source: String,
    pub target: String,
    pub active: bool,
    pub action: RuleAction,
}

/// Per-rule outcomes of one materialization run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    pub outcomes: Vec<RuleOutcome>,
}

impl MaterializeReport {
    /// Sources of `always` rules missing from the template
    pub fn warnings(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.action == RuleAction::MissingRequired)
            .map(|o| o.source.as_str())
            .collect()
    }

    pub fn count(&self, action: RuleAction) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }

    /// True when the run touched nothing on disk
    pub fn is_noop(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| !matches!(o.action, RuleAction::Renamed | RuleAction::Removed))
    }
}

/// Applies a rule table to project directories
#[derive(Debug, Clone, Copy, Default)]
pub struct Materializer {
    strictness: Strictness,
}

impl Materializer {
    pub fn new(strictness: Strictness) -> Self {
        Self { strictness }
    }

    /// Materialize every rule of `rules` under `project_root`
    pub fn materialize(
        &self,
        project_root: &Path,
        rules: &RuleTable,
        snapshot: &FeatureSnapshot,
    ) -> Result<MaterializeReport> {
        let mut report = MaterializeReport::default();
        for rule in rules.iter() {
            let outcome = self.apply_rule(project_root, rule, snapshot)?;
            tracing::debug!(
                source = %outcome.source,
                target = %outcome.target,
                active = outcome.active,
                "{:?}",
                outcome.action
            );
            report.outcomes.push(outcome);
        }
        Ok(report)
    }

    fn apply_rule(
        &self,
        project_root: &Path,
        rule: &Rule,
        snapshot: &FeatureSnapshot,
    ) -> Result<RuleOutcome> {
        let source = resolve(project_root, &rule.source);
        let target = resolve(project_root, &rule.target);
        let active = evaluate_with_policy(&rule.condition, snapshot, self.strictness)?;

        let action = if !source.exists() {
            if rule.condition.is_always() && !target.exists() {
                tracing::warn!("Template file not found: {}", rule.source);
                RuleAction::MissingRequired
            } else if active && rule.renames() && target.exists() {
                RuleAction::AlreadyMaterialized
            } else if !active && rule.action_on_inactive == InactiveAction::Remove {
                if fsutil::remove_path(&target)? {
                    RuleAction::Removed
                } else {
                    RuleAction::NotApplicable
                }
            } else {
                RuleAction::NotApplicable
            }
        } else if active {
            if rule.renames() {
                fsutil::move_file(&source, &target)?;
                RuleAction::Renamed
            } else {
                RuleAction::Kept
            }
        } else {
            match rule.action_on_inactive {
                InactiveAction::Remove => {
                    fsutil::remove_path(&source)?;
                    if rule.renames() {
                        fsutil::remove_path(&target)?;
                    }
                    RuleAction::Removed
                }
                InactiveAction::Skip => RuleAction::LeftUntouched,
            }
        };

        Ok(RuleOutcome {
            source: rule.source.clone(),
            target: rule.target.clone(),
            active,
            action,
        })
    }
}

/// Materialize with the default (permissive) materializer
pub fn materialize(
    project_root: &Path,
    rules: &RuleTable,
    snapshot: &FeatureSnapshot,
) -> Result<MaterializeReport> {
    Materializer::default().materialize(project_root, rules, snapshot)
}

fn resolve(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|s| !s.is_empty())
        .fold(root.to_path_buf(), |acc, part| acc.join(part))
}
