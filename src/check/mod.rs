//! @acp:module "Template Consistency Check"
//! @acp:summary "Lint template variants against the rule table"
//! @acp:domain cli
//! @acp:layer service
//!
//! Lints the shipped template variants against a rule table:
//!
//! - every `always` rule's source must exist in every variant (error)
//! - every template-marked file must be known to the rule table, the manually
//!   managed list or a plugin (warning)

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::Pattern;
use regex::Regex;
use walkdir::WalkDir;

use crate::error::{Result, ScaffoldError};
use crate::plugins::PluginRegistry;
use crate::rules::RuleTable;

/// Directories skipped while scanning a variant
const SKIP_DIRS: &[&str] = &["node_modules", ".yarn", ".git", "dist"];

/// Backup copies left by template sync runs
const BACKUP_PATTERN: &str = "*.backup*";

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Kind of inconsistency
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindingKind {
    /// An `always` rule's source is absent
    MissingRequired { source: String },
    /// A template-marked file no rule or plugin handles
    Unregistered { path: String },
    /// The variant directory itself is missing
    MissingVariant,
}

/// One problem found in one variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub variant: String,
    pub kind: FindingKind,
}

impl Finding {
    pub fn severity(&self) -> Severity {
        match self.kind {
            FindingKind::Unregistered { .. } => Severity::Warning,
            FindingKind::MissingRequired { .. } | FindingKind::MissingVariant => Severity::Error,
        }
    }
}

/// Result of checking a set of variants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub variants_checked: Vec<String>,
    pub findings: Vec<Finding>,
}

impl CheckReport {
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity() == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Checks template variants against a rule table and plugin registry
pub struct TemplateChecker<'a> {
    rules: &'a RuleTable,
    plugins: &'a PluginRegistry,
    marker: Regex,
    backup: Pattern,
}

impl<'a> TemplateChecker<'a> {
    pub fn new(rules: &'a RuleTable, plugins: &'a PluginRegistry) -> Result<Self> {
        // `-template` followed by an extension or end of name; `.env.template` is not marked
        let marker = Regex::new(r"-template(\.[^/]+)?$")
            .map_err(|e| ScaffoldError::Other(e.to_string()))?;
        Ok(Self {
            rules,
            plugins,
            marker,
            backup: backup_pattern()?,
        })
    }

    /// Whether a file name carries the template marker
    pub fn is_marked(&self, name: &str) -> bool {
        self.marker.is_match(name) && !self.backup.matches(name)
    }

    /// Check the named variant directories under `templates_root`
    pub fn check<S: AsRef<str>>(&self, templates_root: &Path, variants: &[S]) -> CheckReport {
        let mut report = CheckReport::default();
        for variant in variants {
            let variant = variant.as_ref();
            report.variants_checked.push(variant.to_string());
            report
                .findings
                .extend(self.check_variant(&templates_root.join(variant), variant));
        }
        report
    }

    fn check_variant(&self, dir: &Path, variant: &str) -> Vec<Finding> {
        let finding = |kind| Finding {
            variant: variant.to_string(),
            kind,
        };

        if !dir.is_dir() {
            return vec![finding(FindingKind::MissingVariant)];
        }

        let mut findings: Vec<Finding> = self
            .rules
            .iter()
            .filter(|r| r.condition.is_always())
            .filter(|r| !dir.join(&r.source).exists())
            .map(|r| {
                finding(FindingKind::MissingRequired {
                    source: r.source.clone(),
                })
            })
            .collect();

        let known: HashSet<String> = self
            .rules
            .known_sources()
            .into_iter()
            .chain(self.plugins.template_files())
            .collect();

        for relative in marked_files(dir, self) {
            let file_name = relative.rsplit('/').next().unwrap_or(&relative);
            if !known.contains(&relative) && !known.contains(file_name) {
                findings.push(finding(FindingKind::Unregistered { path: relative }));
            }
        }

        findings
    }
}

/// Variant directory names present under a template root, sorted
pub fn discover_variants(templates_root: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(templates_root)
        .map_err(|e| ScaffoldError::io("read directory", templates_root, e))?;
    let backup = backup_pattern()?;
    let mut variants: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|e| e.file_name().to_str().map(String::from))
        .filter(|name| !name.starts_with('.') && !backup.matches(name))
        .collect();
    variants.sort();
    Ok(variants)
}

fn backup_pattern() -> Result<Pattern> {
    Pattern::new(BACKUP_PATTERN).map_err(|e| ScaffoldError::Other(e.to_string()))
}

/// Relative, `/`-separated paths of marked files under `dir`
fn marked_files(dir: &Path, checker: &TemplateChecker) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| {
            !(e.file_type().is_dir()
                && e.file_name()
                    .to_str()
                    .map(|n| SKIP_DIRS.contains(&n))
                    .unwrap_or(false))
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|n| checker.is_marked(n))
                .unwrap_or(false)
        })
        .filter_map(|e| relative_slash_path(dir, e.path()))
        .collect();
    files.sort();
    files
}

fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative: PathBuf = path.strip_prefix(root).ok()?.to_path_buf();
    let parts: Vec<&str> = relative
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn test_marker_detection() {
        let rules = RuleTable::builtin();
        let plugins = PluginRegistry::builtin();
        let checker = TemplateChecker::new(&rules, &plugins).unwrap();

        assert!(checker.is_marked("package-template.json"));
        assert!(checker.is_marked(".editorconfig-template"));
        assert!(checker.is_marked("eslint.config-template.mts"));
        assert!(!checker.is_marked(".env.template"));
        assert!(!checker.is_marked("templates.ts"));
        assert!(!checker.is_marked("package-template.json.backup-1"));
    }

    #[test]
    fn test_consistent_variant_has_no_findings() {
        let temp = TempDir::new().unwrap();
        let variant = temp.path().join("default");
        for f in [
            ".gitignore-template",
            ".gitattributes",
            ".env.template",
            "package-template.json",
            "tsconfig-template.json",
            ".prettierrc-template.json",
            "plugins/mongoose.config-template.ts",
        ] {
            write(&variant, f);
        }

        let rules = RuleTable::builtin();
        let plugins = PluginRegistry::builtin();
        let report = TemplateChecker::new(&rules, &plugins)
            .unwrap()
            .check(temp.path(), &["default"]);

        assert_eq!(report.findings, vec![]);
        assert!(!report.has_errors());
    }

    #[test]
    fn test_missing_and_unregistered_reported() {
        let temp = TempDir::new().unwrap();
        let variant = temp.path().join("mongo-crud");
        write(&variant, ".gitignore-template");
        write(&variant, ".env.template");
        write(&variant, "src/vitest.config-template.ts");
        write(&variant, "node_modules/x/ignored-template.js");

        let rules = RuleTable::builtin();
        let plugins = PluginRegistry::builtin();
        let report = TemplateChecker::new(&rules, &plugins)
            .unwrap()
            .check(temp.path(), &["mongo-crud", "absent"]);

        let errors: Vec<&FindingKind> = report.errors().map(|f| &f.kind).collect();
        assert_eq!(
            errors,
            vec![
                &FindingKind::MissingRequired {
                    source: ".gitattributes".to_string()
                },
                &FindingKind::MissingVariant,
            ]
        );
        let warnings: Vec<&FindingKind> = report.warnings().map(|f| &f.kind).collect();
        assert_eq!(
            warnings,
            vec![&FindingKind::Unregistered {
                path: "src/vitest.config-template.ts".to_string()
            }]
        );
    }

    #[test]
    fn test_discover_variants_skips_backups() {
        let temp = TempDir::new().unwrap();
        for d in ["default", "mongo-crud", "templates.backup-1700000000"] {
            std::fs::create_dir(temp.path().join(d)).unwrap();
        }
        std::fs::write(temp.path().join("README.md"), "").unwrap();

        assert_eq!(
            discover_variants(temp.path()).unwrap(),
            vec!["default", "mongo-crud"]
        );
    }
}
