//! @acp:module "Template Mapping"
//! @acp:summary "Bidirectional live/template file name mapping"
//! @acp:domain cli
//! @acp:layer logic
//!
//! Bidirectional canonical-name/template-name table. Both directions are
//! derived from the same entries, so renaming a template tree to its live
//! form and back always uses the same file list.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::RuleTable;
use crate::error::{IoResultExt, Result, ScaffoldError};

/// Infix that keeps templated files from colliding with their live names
pub const TEMPLATE_MARKER: &str = "-template";

/// Directories never descended into when renaming a template tree
const IGNORE_DIRS: &[&str] = &["node_modules", ".yarn", ".git"];

/// Template-marked name for a canonical file name
///
/// The marker goes before the last extension: `tsconfig.json` becomes
/// `tsconfig-template.json`, `eslint.config.mts` becomes
/// `eslint.config-template.mts`. Dotfiles without an extension get it
/// appended: `.editorconfig` becomes `.editorconfig-template`.
pub fn template_name(canonical: &str) -> String {
    let (dir, file) = match canonical.rfind('/') {
        Some(idx) => canonical.split_at(idx + 1),
        None => ("", canonical),
    };
    let split = file
        .rfind('.')
        .filter(|&idx| idx > 0);
    match split {
        Some(idx) => format!("{}{}{}{}", dir, &file[..idx], TEMPLATE_MARKER, &file[idx..]),
        None => format!("{}{}{}", dir, file, TEMPLATE_MARKER),
    }
}

/// Direction of a tree-wide rename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Canonical names to template-marked names
    Templatize,
    /// Template-marked names back to canonical names
    Restore,
}

/// A single rename performed on a template tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renamed {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Canonical file name keyed mapping to template-marked names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateMapping {
    by_canonical: BTreeMap<String, String>,
    by_template: BTreeMap<String, String>,
}

impl TemplateMapping {
    /// Mapping for canonical names using the standard marker placement
    pub fn from_canonical<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mapping = Self::default();
        for name in names {
            let canonical = file_component(name.as_ref());
            mapping.insert(canonical.to_string(), template_name(canonical))?;
        }
        Ok(mapping)
    }

    /// Mapping for every renaming rule plus the manually managed files
    pub fn from_table(table: &RuleTable) -> Result<Self> {
        let mut mapping = Self::from_canonical(table.manually_managed())?;
        for rule in table.iter().filter(|r| r.renames()) {
            mapping.insert(
                file_component(&rule.target).to_string(),
                file_component(&rule.source).to_string(),
            )?;
        }
        Ok(mapping)
    }

    fn insert(&mut self, canonical: String, template: String) -> Result<()> {
        if let Some(existing) = self.by_template.get(&template) {
            if *existing != canonical {
                return Err(ScaffoldError::Other(format!(
                    "Template name {} maps to both {} and {}",
                    template, existing, canonical
                )));
            }
        }
        if let Some(previous) = self.by_canonical.insert(canonical.clone(), template.clone()) {
            self.by_template.remove(&previous);
        }
        self.by_template.insert(template, canonical);
        Ok(())
    }

    pub fn template_for(&self, canonical: &str) -> Option<&str> {
        self.by_canonical.get(canonical).map(String::as_str)
    }

    pub fn canonical_for(&self, template: &str) -> Option<&str> {
        self.by_template.get(template).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_canonical.is_empty()
    }

    /// Rename every mapped file under `root` in the given direction
    pub fn rename_tree(&self, root: &Path, direction: Direction) -> Result<Vec<Renamed>> {
        let planned: Vec<Renamed> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !(e.file_type().is_dir() && is_ignored(e.file_name())))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let name = e.file_name().to_str()?;
                let renamed = match direction {
                    Direction::Templatize => self.template_for(name),
                    Direction::Restore => self.canonical_for(name),
                }?;
                Some(Renamed {
                    from: e.path().to_path_buf(),
                    to: e.path().with_file_name(renamed),
                })
            })
            .collect();

        for step in &planned {
            std::fs::rename(&step.from, &step.to).with_path("rename", &step.from)?;
            tracing::debug!("Renamed {} -> {}", step.from.display(), step.to.display());
        }

        Ok(planned)
    }
}

fn file_component(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn is_ignored(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|n| IGNORE_DIRS.contains(&n)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_template_name_placement() {
        assert_eq!(template_name("package.json"), "package-template.json");
        assert_eq!(template_name(".prettierrc.json"), ".prettierrc-template.json");
        assert_eq!(template_name(".prettierignore"), ".prettierignore-template");
        assert_eq!(template_name("eslint.config.mts"), "eslint.config-template.mts");
        assert_eq!(template_name(".editorconfig"), ".editorconfig-template");
        assert_eq!(
            template_name("plugins/mongoose.config.ts"),
            "plugins/mongoose.config-template.ts"
        );
    }

    #[test]
    fn test_mapping_is_bidirectional() {
        let mapping = TemplateMapping::from_table(&RuleTable::builtin()).unwrap();
        for canonical in ["package.json", "tsconfig.json", ".gitignore", "eslint.config.mts"] {
            let template = mapping.template_for(canonical).unwrap();
            assert_eq!(mapping.canonical_for(template), Some(canonical));
        }
        // Non-renaming rules are not part of the mapping
        assert_eq!(mapping.template_for(".gitattributes"), None);
    }

    #[test]
    fn test_conflicting_template_name_rejected() {
        let mut mapping = TemplateMapping::default();
        mapping.insert("a.json".into(), "x-template".into()).unwrap();
        assert!(mapping.insert("b.json".into(), "x-template".into()).is_err());
    }

    #[test]
    fn test_rename_tree_round_trip() {
        let temp = TempDir::new().unwrap();
        let variant = temp.path().join("default");
        std::fs::create_dir_all(variant.join("node_modules/pkg")).unwrap();
        std::fs::write(variant.join("package.json"), "{}").unwrap();
        std::fs::write(variant.join(".editorconfig"), "root = true").unwrap();
        std::fs::write(variant.join("node_modules/pkg/package.json"), "{}").unwrap();

        let mapping = TemplateMapping::from_table(&RuleTable::builtin()).unwrap();

        let renamed = mapping.rename_tree(temp.path(), Direction::Templatize).unwrap();
        assert_eq!(renamed.len(), 2);
        assert!(variant.join("package-template.json").exists());
        assert!(variant.join(".editorconfig-template").exists());
        assert!(variant.join("node_modules/pkg/package.json").exists());

        let restored = mapping.rename_tree(temp.path(), Direction::Restore).unwrap();
        assert_eq!(restored.len(), 2);
        assert!(variant.join("package.json").exists());
        assert!(variant.join(".editorconfig").exists());
        assert!(!variant.join("package-template.json").exists());
    }
}
