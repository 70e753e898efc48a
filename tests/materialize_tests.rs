//! Rule engine integration tests
//!
//! Materialization invariants, descriptor trimming, the template mapping and
//! the consistency check, exercised on the bundled templates.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

use fastymini::check::{discover_variants, TemplateChecker};
use fastymini::descriptor::{apply_features, DescriptorSettings, PackageDescriptor};
use fastymini::fsutil::copy_tree;
use fastymini::rules::mapping::Direction;
use fastymini::{
    materialize, Condition, FeatureSnapshot, InactiveAction, PluginRegistry, Rule, RuleAction,
    RuleTable, TemplateMapping,
};

fn bundled_templates() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}

fn copy_variant(variant: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    copy_tree(&bundled_templates().join(variant), temp.path()).unwrap();
    temp
}

fn files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}

fn snapshot(prettier: bool, eslint: bool, editorconfig: bool) -> FeatureSnapshot {
    FeatureSnapshot {
        prettier,
        eslint,
        editorconfig,
        database: None,
    }
}

// =============================================================================
// Single-rule scenarios
// =============================================================================

mod scenario_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> RuleTable {
        RuleTable::with_rules(vec![Rule::new(
            "x-template.json",
            "x.json",
            Condition::Prettier,
            InactiveAction::Remove,
        )])
        .unwrap()
    }

    #[test]
    fn test_inactive_remove_rule_deletes_both_names() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("x-template.json"), "{}").unwrap();

        materialize(temp.path(), &table(), &snapshot(false, true, true)).unwrap();

        assert!(!temp.path().join("x-template.json").exists());
        assert!(!temp.path().join("x.json").exists());
    }

    #[test]
    fn test_active_rule_renames_with_content() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("x-template.json"), r#"{"semi":true}"#).unwrap();

        let report = materialize(temp.path(), &table(), &snapshot(true, true, true)).unwrap();

        assert_eq!(report.count(RuleAction::Renamed), 1);
        assert!(!temp.path().join("x-template.json").exists());
        assert_eq!(
            std::fs::read_to_string(temp.path().join("x.json")).unwrap(),
            r#"{"semi":true}"#
        );
    }

    #[test]
    fn test_descriptor_trim_for_disabled_linting() {
        let mut descriptor = PackageDescriptor::from_json(
            r#"{
  "name": "placeholder",
  "dependencies": { "eslint": "1.0", "core": "2.0" },
  "scripts": { "lint": "eslint .", "build": "tsc" }
}"#,
        )
        .unwrap();
        let flags = FeatureSnapshot {
            prettier: true,
            eslint: false,
            editorconfig: true,
            database: None,
        };

        apply_features(&mut descriptor, "my-app", &flags, &DescriptorSettings::default());

        assert_eq!(
            descriptor.to_json().unwrap(),
            r#"{
  "name": "my-app",
  "dependencies": {
    "core": "2.0"
  },
  "scripts": {
    "build": "tsc"
  }
}
"#
        );
    }
}

// =============================================================================
// Whole-table invariants
// =============================================================================

mod invariant_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rule_invariants_hold_for_every_flag_combination() {
        let table = RuleTable::builtin();
        for bits in 0..8u8 {
            let flags = snapshot(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0);
            let project = copy_variant("default");
            let root = project.path();

            materialize(root, &table, &flags).unwrap();

            for rule in table.iter() {
                let active = fastymini::rules::evaluate(&rule.condition, &flags);
                let source = root.join(&rule.source).exists();
                let target = root.join(&rule.target).exists();
                if !active && rule.action_on_inactive == InactiveAction::Remove {
                    assert!(!source && !target, "{} left behind for {:?}", rule.source, flags);
                }
                if active && rule.renames() {
                    assert!(target && !source, "{} not renamed for {:?}", rule.source, flags);
                }
            }
        }
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let table = RuleTable::builtin();
        let flags = snapshot(true, false, true);
        let project = copy_variant("mongo-crud");

        materialize(project.path(), &table, &flags).unwrap();
        let after_first = files(project.path());
        let second = materialize(project.path(), &table, &flags).unwrap();

        assert_eq!(files(project.path()), after_first);
        assert_eq!(second.count(RuleAction::Renamed), 0);
        assert_eq!(second.count(RuleAction::Removed), 0);
        assert!(second.warnings().is_empty());
    }

    #[test]
    fn test_independent_tables_do_not_interfere() {
        let project = copy_variant("default");
        let only_gitignore = RuleTable::with_rules(vec![Rule::templated(
            ".gitignore",
            Condition::Always,
            InactiveAction::Skip,
        )])
        .unwrap();

        materialize(project.path(), &only_gitignore, &snapshot(false, false, false)).unwrap();

        assert!(project.path().join(".gitignore").exists());
        // Untouched by the reduced table
        assert!(project.path().join(".prettierrc-template.json").exists());
        assert_eq!(RuleTable::builtin().len(), 7);
    }
}

// =============================================================================
// Template mapping
// =============================================================================

mod mapping_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_restore_then_templatize_round_trips_variant() {
        let project = copy_variant("mongo-crud-vitest");
        let original = files(project.path());
        let mapping = TemplateMapping::from_table(&RuleTable::builtin()).unwrap();

        let restored = mapping
            .rename_tree(project.path(), Direction::Restore)
            .unwrap();
        assert!(project.path().join("package.json").exists());
        assert!(project.path().join("eslint.config.mts").exists());
        assert!(!project.path().join(".gitignore-template").exists());

        let templatized = mapping
            .rename_tree(project.path(), Direction::Templatize)
            .unwrap();

        assert_eq!(restored.len(), templatized.len());
        assert_eq!(files(project.path()), original);
    }

    #[test]
    fn test_node_modules_skipped() {
        let project = copy_variant("default");
        let nested = project.path().join("node_modules/pkg");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("package.json"), "{}").unwrap();

        let mapping = TemplateMapping::from_table(&RuleTable::builtin()).unwrap();
        mapping
            .rename_tree(project.path(), Direction::Templatize)
            .unwrap();

        assert!(nested.join("package.json").exists());
    }
}

// =============================================================================
// Consistency check
// =============================================================================

mod check_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bundled_templates_are_consistent() {
        let root = bundled_templates();
        let variants = discover_variants(&root).unwrap();
        assert_eq!(variants, vec!["default", "mongo-crud", "mongo-crud-vitest"]);

        let rules = RuleTable::builtin();
        let plugins = PluginRegistry::builtin();
        let report = TemplateChecker::new(&rules, &plugins)
            .unwrap()
            .check(&root, &variants);

        assert!(report.findings.is_empty(), "{:?}", report.findings);
    }
}
