//! @acp:module "Project Creation"
//! @acp:summary "Staged project creation with rollback"
//! @acp:domain cli
//! @acp:layer service
//!
//! Orchestrates one project creation: copy the template tree, transform the
//! package descriptor, materialize the rule table, apply plugins, relocate
//! secondary config, then optionally initialize git and install dependencies.
//!
//! Any fatal failure after the project directory has been created removes
//! the whole directory before the original error is returned.

pub mod git;
pub mod install;
pub mod relocate;

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{InstallFailurePolicy, PackageManager, ScaffoldConfig};
use crate::descriptor::{
    project_name_from_dir, transform_package_descriptor, DescriptorOutcome, DescriptorSettings,
};
use crate::error::{Result, ScaffoldError};
use crate::fsutil;
use crate::materialize::{MaterializeReport, Materializer};
use crate::plugins::{Plugin, PluginOutcome, PluginRegistry};
use crate::rules::{FeatureSnapshot, RuleTable};
use crate::templates::TemplateVariant;

pub use install::Installer;

/// Lifecycle of a creation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Initial,
    TreeCopied,
    DescriptorTransformed,
    RulesMaterialized,
    PluginsApplied,
    SecondaryConfigRelocated,
    GitInitialized,
    DependenciesInstalled,
    Done,
    RolledBack,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Initial => "initial",
            Stage::TreeCopied => "tree-copied",
            Stage::DescriptorTransformed => "descriptor-transformed",
            Stage::RulesMaterialized => "rules-materialized",
            Stage::PluginsApplied => "plugins-applied",
            Stage::SecondaryConfigRelocated => "secondary-config-relocated",
            Stage::GitInitialized => "git-initialized",
            Stage::DependenciesInstalled => "dependencies-installed",
            Stage::Done => "done",
            Stage::RolledBack => "rolled-back",
        };
        f.write_str(name)
    }
}

/// Failed creation: the original error plus where it happened
#[derive(Error, Debug)]
#[error("Project creation failed after stage {completed}: {source}")]
pub struct CreateError {
    /// Last stage that completed before the failure
    pub completed: Stage,
    /// Whether the project directory was removed
    pub rolled_back: bool,
    #[source]
    pub source: ScaffoldError,
}

impl CreateError {
    pub fn final_stage(&self) -> Stage {
        if self.rolled_back {
            Stage::RolledBack
        } else {
            self.completed
        }
    }
}

/// Fully resolved input for one creation
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Project name written into the descriptor
    pub project_name: String,
    /// Directory the project is created in
    pub root: PathBuf,
    pub template: TemplateVariant,
    pub package_manager: PackageManager,
    pub features: FeatureSnapshot,
    pub skip_install: bool,
    pub enable_git: bool,
}

impl CreateOptions {
    /// Options for a directory argument, resolved against `cwd`
    pub fn new(directory: &str, cwd: &Path) -> Self {
        Self {
            project_name: project_name_from_dir(directory),
            root: cwd.join(directory),
            template: TemplateVariant::default(),
            package_manager: PackageManager::default(),
            features: FeatureSnapshot::default(),
            skip_install: false,
            enable_git: false,
        }
    }
}

/// Everything a successful creation did
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub project_name: String,
    pub root: PathBuf,
    pub files_copied: usize,
    pub descriptor: DescriptorOutcome,
    pub rules: MaterializeReport,
    pub plugins: Vec<PluginOutcome>,
    pub tsconfig_relocated: bool,
    pub gitignore_written: bool,
    pub git_initialized: bool,
    pub dependencies_installed: bool,
    /// Soft warnings collected along the way
    pub warnings: Vec<String>,
    pub stage: Stage,
}

impl CreateReport {
    fn new(options: &CreateOptions) -> Self {
        Self {
            project_name: options.project_name.clone(),
            root: options.root.clone(),
            files_copied: 0,
            descriptor: DescriptorOutcome::default(),
            rules: MaterializeReport::default(),
            plugins: Vec::new(),
            tsconfig_relocated: false,
            gitignore_written: false,
            git_initialized: false,
            dependencies_installed: false,
            warnings: Vec::new(),
            stage: Stage::Initial,
        }
    }
}

/// Creates projects from a template root
pub struct ProjectCreator {
    templates_root: PathBuf,
    rules: RuleTable,
    plugins: PluginRegistry,
    materializer: Materializer,
    descriptor: DescriptorSettings,
    install_failure: InstallFailurePolicy,
    installer: Option<Installer>,
}

impl ProjectCreator {
    /// Creator with built-in rules and plugins
    pub fn new(templates_root: impl Into<PathBuf>) -> Self {
        Self {
            templates_root: templates_root.into(),
            rules: RuleTable::builtin(),
            plugins: PluginRegistry::builtin(),
            materializer: Materializer::default(),
            descriptor: DescriptorSettings::default(),
            install_failure: InstallFailurePolicy::default(),
            installer: None,
        }
    }

    /// Creator configured from a [`ScaffoldConfig`]
    pub fn from_config(config: &ScaffoldConfig, templates_root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            rules: config.rule_table()?,
            materializer: Materializer::new(config.unknown_conditions),
            descriptor: config.descriptor.clone(),
            install_failure: config.install_failure,
            ..Self::new(templates_root)
        })
    }

    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_plugin(mut self, plugin: Box<dyn Plugin>) -> Self {
        self.plugins.register(plugin);
        self
    }

    pub fn with_install_failure(mut self, policy: InstallFailurePolicy) -> Self {
        self.install_failure = policy;
        self
    }

    /// Override the program run for the install step
    pub fn with_installer(mut self, installer: Installer) -> Self {
        self.installer = Some(installer);
        self
    }

    pub fn templates_root(&self) -> &Path {
        &self.templates_root
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Create a project, rolling back on any fatal error
    pub async fn create(&self, options: &CreateOptions) -> std::result::Result<CreateReport, CreateError> {
        let before_start = |source| CreateError {
            completed: Stage::Initial,
            rolled_back: false,
            source,
        };

        if options.root.exists() {
            return Err(before_start(ScaffoldError::ProjectExists(options.root.clone())));
        }
        let template_dir = options
            .template
            .locate(&self.templates_root)
            .map_err(before_start)?;

        // Rollback removes everything this run created, including new parents
        let created = outermost_missing(&options.root);

        let mut report = CreateReport::new(options);
        match self.run(&template_dir, options, &mut report).await {
            Ok(()) => {
                report.stage = Stage::Done;
                tracing::info!("Project {} created", options.project_name);
                Ok(report)
            }
            Err(source) => Err(abort(report.stage, source, &created)),
        }
    }

    async fn run(
        &self,
        template_dir: &Path,
        options: &CreateOptions,
        report: &mut CreateReport,
    ) -> Result<()> {
        let root = options.root.as_path();
        let features = &options.features;

        report.files_copied = fsutil::copy_tree(template_dir, root)?;
        self.advance(report, Stage::TreeCopied);

        report.descriptor =
            transform_package_descriptor(root, &options.project_name, features, &self.descriptor)?;
        if report.descriptor.template_left_behind {
            report
                .warnings
                .push("Template package descriptor could not be removed".to_string());
        }
        self.advance(report, Stage::DescriptorTransformed);

        report.rules = self.materializer.materialize(root, &self.rules, features)?;
        for missing in report.rules.warnings() {
            report
                .warnings
                .push(format!("Template file not found: {}", missing));
        }
        self.advance(report, Stage::RulesMaterialized);

        report.plugins = self.plugins.apply_all(root, features)?;
        self.advance(report, Stage::PluginsApplied);

        report.tsconfig_relocated = relocate::relocate_tsconfig(root)?;
        report.gitignore_written = relocate::ensure_gitignore(root);
        self.advance(report, Stage::SecondaryConfigRelocated);

        if options.enable_git {
            match git::init_repository(root) {
                Ok(()) => report.git_initialized = true,
                Err(e) => {
                    tracing::warn!("Git initialization failed: {}", e);
                    report.warnings.push(format!("Git initialization failed: {}", e));
                }
            }
            self.advance(report, Stage::GitInitialized);
        }

        if options.skip_install {
            tracing::info!("Skipping dependency installation");
        } else {
            let installer = self
                .installer
                .clone()
                .unwrap_or_else(|| Installer::for_package_manager(options.package_manager));
            match installer.run(root).await {
                Ok(()) => report.dependencies_installed = true,
                Err(e) => match self.install_failure {
                    InstallFailurePolicy::Warn => {
                        tracing::warn!("Dependency installation failed: {}", e);
                        report
                            .warnings
                            .push(format!("Dependency installation failed: {}", e));
                    }
                    InstallFailurePolicy::Fail => return Err(e),
                },
            }
            self.advance(report, Stage::DependenciesInstalled);
        }

        Ok(())
    }

    fn advance(&self, report: &mut CreateReport, stage: Stage) {
        tracing::debug!("Stage {} -> {}", report.stage, stage);
        report.stage = stage;
    }
}

/// Outermost directory on the way to `root` that does not exist yet
fn outermost_missing(root: &Path) -> PathBuf {
    let mut outermost = root.to_path_buf();
    for ancestor in root.ancestors() {
        if ancestor.as_os_str().is_empty() || ancestor.exists() {
            break;
        }
        outermost = ancestor.to_path_buf();
    }
    outermost
}

/// Roll back and wrap the original error; cleanup failure never replaces it
fn abort(completed: Stage, source: ScaffoldError, created: &Path) -> CreateError {
    let rolled_back = rollback(created);
    CreateError {
        completed,
        rolled_back,
        source,
    }
}

/// Remove a partially created project, never failing
fn rollback(root: &Path) -> bool {
    match fsutil::remove_path(root) {
        Ok(_) => {
            tracing::info!("Project creation failed, cleaned up {}", root.display());
            true
        }
        Err(e) => {
            tracing::error!(
                "Failed to remove project folder {} after error: {}",
                root.display(),
                e
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_options_from_directory() {
        let options = CreateOptions::new("apps/my-api/", Path::new("/work"));
        assert_eq!(options.project_name, "my-api");
        assert_eq!(options.root, PathBuf::from("/work/apps/my-api/"));
    }

    #[test]
    fn test_final_stage_reports_rollback() {
        let err = CreateError {
            completed: Stage::PluginsApplied,
            rolled_back: true,
            source: ScaffoldError::Other("boom".into()),
        };
        assert_eq!(err.final_stage(), Stage::RolledBack);
        assert!(err.to_string().contains("plugins-applied"));
    }

    #[test]
    fn test_outermost_missing_ancestor() {
        let temp = tempfile::TempDir::new().unwrap();
        let nested = temp.path().join("apps/service/");
        assert_eq!(outermost_missing(&nested), temp.path().join("apps"));

        std::fs::create_dir(temp.path().join("apps")).unwrap();
        assert_eq!(outermost_missing(&nested), temp.path().join("apps/service"));
        assert_eq!(outermost_missing(Path::new("fresh")), PathBuf::from("fresh"));
    }

    #[test]
    fn test_failed_rollback_keeps_original_error() {
        // NUL bytes make every filesystem call on the path fail
        let err = abort(
            Stage::PluginsApplied,
            ScaffoldError::Other("plugin exploded".into()),
            Path::new("unremovable\0dir"),
        );

        assert!(!err.rolled_back);
        assert_eq!(err.completed, Stage::PluginsApplied);
        assert_eq!(err.final_stage(), Stage::PluginsApplied);
        assert!(matches!(&err.source, ScaffoldError::Other(m) if m == "plugin exploded"));
    }

    #[test]
    fn test_rollback_missing_directory_succeeds() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(rollback(&temp.path().join("never-created")));
    }
}
