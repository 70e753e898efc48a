//! @acp:module "Package Descriptor"
//! @acp:summary "Order-preserving package.json transform"
//! @acp:domain cli
//! @acp:layer logic
//!
//! Loads `package-template.json`, stamps the project name, trims tooling
//! entries for disabled features, injects the selected database package and
//! writes the result to `package.json`.
//!
//! Every field the transform does not know about is carried through in its
//! original position.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{IoResultExt, Result, ScaffoldError};
use crate::rules::{template_name, FeatureSnapshot};

/// Final descriptor file name
pub const DESCRIPTOR_FILE: &str = "package.json";

/// Ordered string map used for dependencies and scripts
pub type EntryMap = Map<String, Value>;

/// Dependency sections the trimming and injection operate on
const DEPENDENCY_SECTIONS: [&str; 2] = ["dependencies", "devDependencies"];

/// `package.json` contents, kept as an ordered object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageDescriptor {
    fields: Map<String, Value>,
}

impl PackageDescriptor {
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Serialize with 2-space indentation and a trailing newline
    pub fn to_json(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    pub fn set_name(&mut self, name: &str) {
        self.fields
            .insert("name".to_string(), Value::String(name.to_string()));
    }

    /// A mapping section such as `scripts` or `devDependencies`
    pub fn section(&self, key: &str) -> Option<&EntryMap> {
        self.fields.get(key).and_then(Value::as_object)
    }

    fn section_mut(&mut self, key: &str) -> Option<&mut EntryMap> {
        self.fields.get_mut(key).and_then(Value::as_object_mut)
    }

    /// Remove a package from every dependency section
    pub fn remove_dependency(&mut self, name: &str) -> bool {
        let mut removed = false;
        for key in DEPENDENCY_SECTIONS {
            if let Some(map) = self.section_mut(key) {
                removed |= map.shift_remove(name).is_some();
            }
        }
        removed
    }

    pub fn remove_script(&mut self, name: &str) -> bool {
        self.section_mut("scripts")
            .map(|s| s.shift_remove(name).is_some())
            .unwrap_or(false)
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        DEPENDENCY_SECTIONS
            .iter()
            .filter_map(|key| self.section(key))
            .any(|m| m.contains_key(name))
    }

    /// Add a runtime dependency unless a dependency section already lists it
    pub fn add_dependency(&mut self, name: &str, version: &str) -> bool {
        if self.has_dependency(name) {
            return false;
        }
        let deps = self
            .fields
            .entry("dependencies")
            .or_insert_with(|| Value::Object(Map::new()));
        if !deps.is_object() {
            *deps = Value::Object(Map::new());
        }
        if let Some(map) = deps.as_object_mut() {
            map.insert(name.to_string(), Value::String(version.to_string()));
        }
        true
    }
}

/// Tunables for the descriptor transform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorSettings {
    /// Packages removed alongside `eslint` when linting is disabled
    #[serde(default = "default_lint_adjacent")]
    pub lint_adjacent: Vec<String>,

    /// Pinned version per database package
    #[serde(default = "default_database_versions")]
    pub database_versions: Map<String, Value>,
}

impl Default for DescriptorSettings {
    fn default() -> Self {
        Self {
            lint_adjacent: default_lint_adjacent(),
            database_versions: default_database_versions(),
        }
    }
}

impl DescriptorSettings {
    fn database_version(&self, package: &str) -> &str {
        self.database_versions
            .get(package)
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_DATABASE_VERSION)
    }
}

const DEFAULT_DATABASE_VERSION: &str = "^8.9.0";

fn default_lint_adjacent() -> Vec<String> {
    [
        "@eslint/js",
        "typescript-eslint",
        "@typescript-eslint/parser",
        "@typescript-eslint/eslint-plugin",
        "eslint-config-prettier",
        "eslint-plugin-prettier",
        "globals",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_database_versions() -> Map<String, Value> {
    let mut versions = Map::new();
    versions.insert(
        "mongoose".to_string(),
        Value::String(DEFAULT_DATABASE_VERSION.to_string()),
    );
    versions
}

/// What the transform changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorOutcome {
    pub name: String,
    pub removed_dependencies: Vec<String>,
    pub removed_scripts: Vec<String>,
    pub added_dependencies: Vec<String>,
    pub output_path: PathBuf,
    /// Template file could not be deleted after the write
    pub template_left_behind: bool,
}

/// Final project name from the user-supplied directory argument
///
/// Takes the last non-empty path segment, so `apps/my-app/` yields `my-app`.
pub fn project_name_from_dir(dir: &str) -> String {
    dir.split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .last()
        .unwrap_or(dir)
        .to_string()
}

/// Apply feature flags to an in-memory descriptor
pub fn apply_features(
    descriptor: &mut PackageDescriptor,
    project_name: &str,
    flags: &FeatureSnapshot,
    settings: &DescriptorSettings,
) -> DescriptorOutcome {
    let mut outcome = DescriptorOutcome {
        name: project_name.to_string(),
        ..Default::default()
    };
    descriptor.set_name(project_name);

    let mut drop_deps: Vec<&str> = Vec::new();
    let mut drop_scripts: Vec<&str> = Vec::new();

    if !flags.prettier {
        drop_deps.push("prettier");
        drop_scripts.push("format");
    }
    if !flags.eslint {
        drop_deps.push("eslint");
        drop_deps.extend(settings.lint_adjacent.iter().map(String::as_str));
        drop_scripts.extend(["lint", "lint:fix"]);
    }

    for dep in drop_deps {
        if descriptor.remove_dependency(dep) {
            outcome.removed_dependencies.push(dep.to_string());
        }
    }
    for script in drop_scripts {
        if descriptor.remove_script(script) {
            outcome.removed_scripts.push(script.to_string());
        }
    }

    if let Some(database) = flags.database {
        let package = database.package_name();
        if descriptor.add_dependency(package, settings.database_version(package)) {
            outcome.added_dependencies.push(package.to_string());
        }
    }

    outcome
}

/// Transform `package-template.json` under `project_root` into `package.json`
///
/// A failed write leaves the template in place. A failed template removal
/// after a successful write is only logged.
pub fn transform_package_descriptor(
    project_root: &Path,
    project_name: &str,
    flags: &FeatureSnapshot,
    settings: &DescriptorSettings,
) -> Result<DescriptorOutcome> {
    let template_path = project_root.join(template_name(DESCRIPTOR_FILE));
    let output_path = project_root.join(DESCRIPTOR_FILE);

    let content = match std::fs::read_to_string(&template_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScaffoldError::DescriptorMissing(template_path));
        }
        Err(e) => return Err(ScaffoldError::io("read", template_path, e)),
    };
    let mut descriptor = PackageDescriptor::from_json(&content).map_err(|source| {
        ScaffoldError::DescriptorMalformed {
            path: template_path.clone(),
            source,
        }
    })?;

    let mut outcome = apply_features(&mut descriptor, project_name, flags, settings);

    std::fs::write(&output_path, descriptor.to_json()?).with_path("write", &output_path)?;
    tracing::debug!("Wrote {}", output_path.display());

    outcome.template_left_behind = !consume_template(&template_path);
    outcome.output_path = output_path;
    Ok(outcome)
}

/// Delete the template once its output is written; failures are only logged
fn consume_template(template_path: &Path) -> bool {
    match std::fs::remove_file(template_path) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                "Failed to remove {} after writing {}: {}",
                template_path.display(),
                DESCRIPTOR_FILE,
                e
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Database;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn template() -> &'static str {
        r#"{
  "name": "placeholder",
  "version": "1.0.0",
  "type": "module",
  "scripts": {
    "dev": "nodemon",
    "build": "node esbuild.config.ts",
    "lint": "eslint .",
    "lint:fix": "eslint . --fix",
    "format": "prettier --write ."
  },
  "dependencies": {
    "fastify": "^5.2.0"
  },
  "devDependencies": {
    "eslint": "^9.17.0",
    "@eslint/js": "^9.17.0",
    "typescript-eslint": "^8.18.0",
    "prettier": "^3.4.2",
    "typescript": "^5.7.2"
  },
  "engines": {
    "node": ">=20"
  }
}"#
    }

    #[test]
    fn test_project_name_from_dir() {
        assert_eq!(project_name_from_dir("my-app"), "my-app");
        assert_eq!(project_name_from_dir("apps/my-app/"), "my-app");
        assert_eq!(project_name_from_dir("./nested//deep///"), "deep");
        assert_eq!(project_name_from_dir(r"C:\work\api"), "api");
    }

    #[test]
    fn test_all_features_enabled_only_renames() {
        let mut descriptor = PackageDescriptor::from_json(template()).unwrap();
        let original = descriptor.clone();
        let flags = FeatureSnapshot {
            prettier: true,
            eslint: true,
            editorconfig: true,
            database: None,
        };

        let outcome = apply_features(&mut descriptor, "api", &flags, &DescriptorSettings::default());

        assert_eq!(descriptor.name(), Some("api"));
        assert_eq!(descriptor.section("scripts"), original.section("scripts"));
        assert_eq!(
            descriptor.section("devDependencies"),
            original.section("devDependencies")
        );
        assert!(outcome.removed_dependencies.is_empty());
    }

    #[test]
    fn test_lint_disabled_removes_adjacent() {
        let mut descriptor = PackageDescriptor::from_json(template()).unwrap();
        let flags = FeatureSnapshot {
            prettier: true,
            ..Default::default()
        };

        let outcome = apply_features(&mut descriptor, "api", &flags, &DescriptorSettings::default());

        let dev = descriptor.section("devDependencies").unwrap();
        assert_eq!(
            dev.keys().collect::<Vec<_>>(),
            vec!["prettier", "typescript"]
        );
        let scripts = descriptor.section("scripts").unwrap();
        assert_eq!(
            scripts.keys().collect::<Vec<_>>(),
            vec!["dev", "build", "format"]
        );
        assert_eq!(
            outcome.removed_dependencies,
            vec!["eslint", "@eslint/js", "typescript-eslint"]
        );
    }

    #[test]
    fn test_database_injected_with_pinned_version() {
        let mut descriptor = PackageDescriptor::from_json(template()).unwrap();
        let flags = FeatureSnapshot {
            prettier: true,
            eslint: true,
            editorconfig: true,
            database: Some(Database::Mongoose),
        };

        let outcome = apply_features(&mut descriptor, "api", &flags, &DescriptorSettings::default());

        assert_eq!(outcome.added_dependencies, vec!["mongoose"]);
        assert_eq!(
            descriptor.section("dependencies").unwrap().get("mongoose"),
            Some(&json!("^8.9.0"))
        );

        // Already present: left alone
        let again = apply_features(&mut descriptor, "api", &flags, &DescriptorSettings::default());
        assert!(again.added_dependencies.is_empty());
    }

    #[test]
    fn test_unknown_fields_preserved_in_order() {
        let mut descriptor = PackageDescriptor::from_json(template()).unwrap();
        apply_features(
            &mut descriptor,
            "api",
            &FeatureSnapshot::default(),
            &DescriptorSettings::default(),
        );
        let out = descriptor.to_json().unwrap();
        assert!(out.ends_with("}\n"));
        assert!(out.starts_with("{\n  \"name\": \"api\",\n  \"version\": \"1.0.0\",\n  \"type\": \"module\""));
        let engines = out.find("\"engines\"").unwrap();
        let dev = out.find("\"devDependencies\"").unwrap();
        assert!(dev < engines);
    }

    #[test]
    fn test_transform_consumes_template() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("package-template.json"), template()).unwrap();

        let outcome = transform_package_descriptor(
            temp.path(),
            "my-app",
            &FeatureSnapshot::default(),
            &DescriptorSettings::default(),
        )
        .unwrap();

        assert!(!temp.path().join("package-template.json").exists());
        assert!(!outcome.template_left_behind);
        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&outcome.output_path).unwrap()).unwrap();
        assert_eq!(written["name"], json!("my-app"));
        assert!(written["devDependencies"].get("prettier").is_none());
    }

    #[test]
    fn test_transform_missing_template_is_fatal() {
        let temp = TempDir::new().unwrap();
        let err = transform_package_descriptor(
            temp.path(),
            "my-app",
            &FeatureSnapshot::default(),
            &DescriptorSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ScaffoldError::DescriptorMissing(_)));
    }

    #[test]
    fn test_transform_malformed_template_keeps_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("package-template.json"), "{ not json").unwrap();
        let err = transform_package_descriptor(
            temp.path(),
            "my-app",
            &FeatureSnapshot::default(),
            &DescriptorSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ScaffoldError::DescriptorMalformed { .. }));
        assert!(temp.path().join("package-template.json").exists());
        assert!(!temp.path().join("package.json").exists());
    }

    #[test]
    fn test_failed_write_keeps_template() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("package-template.json"), template()).unwrap();
        std::fs::create_dir(temp.path().join("package.json")).unwrap();

        let err = transform_package_descriptor(
            temp.path(),
            "my-app",
            &FeatureSnapshot::default(),
            &DescriptorSettings::default(),
        )
        .unwrap_err();

        assert!(matches!(err, ScaffoldError::Io { action: "write", .. }));
        assert!(temp.path().join("package-template.json").is_file());
    }

    #[test]
    fn test_unremovable_template_is_only_flagged() {
        let temp = TempDir::new().unwrap();
        let stuck = temp.path().join("package-template.json");
        std::fs::create_dir(&stuck).unwrap();

        assert!(!consume_template(&stuck));
        assert!(stuck.is_dir());

        let removable = temp.path().join("other-template.json");
        std::fs::write(&removable, "{}").unwrap();
        assert!(consume_template(&removable));
        assert!(!removable.exists());
    }
}
