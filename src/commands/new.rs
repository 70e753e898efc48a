//! @acp:module "New Command"
//! @acp:summary "Create a new project from a template variant"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `create-fastymini new`: resolve every option (flags, config,
//! then prompts), run the project creator and print the next steps.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{PackageManager, ScaffoldConfig};
use crate::project::{CreateOptions, CreateReport, ProjectCreator};
use crate::rules::FeatureSnapshot;
use crate::templates::TemplateVariant;

/// Project name offered when none is given
pub const DEFAULT_PROJECT_NAME: &str = "my-fastymini-app";

/// Options for the new command
#[derive(Debug, Clone, Default)]
pub struct NewOptions {
    /// Target directory, relative to the working directory
    pub directory: Option<String>,
    pub template: Option<TemplateVariant>,
    pub eslint: Option<bool>,
    pub prettier: Option<bool>,
    /// Cleared by `--no-editorconfig`
    pub no_editorconfig: bool,
    pub package_manager: Option<PackageManager>,
    pub skip_install: bool,
    pub enable_git: bool,
    /// Template root override
    pub templates_dir: Option<PathBuf>,
    /// Skip interactive prompts (use defaults + CLI args)
    pub yes: bool,
}

/// Execute the new command
pub async fn execute_new(options: NewOptions, config: &ScaffoldConfig) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let theme = ColorfulTheme::default();
    let interactive = !options.yes;

    let directory = match options.directory.clone() {
        Some(dir) => dir,
        None if interactive => Input::with_theme(&theme)
            .with_prompt("Your project name")
            .default(DEFAULT_PROJECT_NAME.to_string())
            .interact_text()?,
        None => DEFAULT_PROJECT_NAME.to_string(),
    };

    let mut create = CreateOptions::new(&directory, &cwd);
    if create.root.exists() {
        anyhow::bail!(
            "Directory {} already exists. Choose another project name.",
            create.root.display()
        );
    }

    create.template = match options.template {
        Some(template) => template,
        None if interactive => prompt_template(&theme)?,
        None => TemplateVariant::default(),
    };

    let eslint = match options.eslint {
        Some(value) => value,
        None if interactive => Confirm::with_theme(&theme)
            .with_prompt("Do you want to initialize with ESLint?")
            .default(true)
            .interact()?,
        None => true,
    };

    let prettier = match options.prettier {
        Some(value) => value,
        None if interactive => Confirm::with_theme(&theme)
            .with_prompt("Do you want to initialize with Prettier?")
            .default(false)
            .interact()?,
        None => false,
    };

    create.package_manager = match options.package_manager.or(config.package_manager) {
        Some(pm) => pm,
        None if interactive => prompt_package_manager(&theme)?,
        None => PackageManager::default(),
    };

    create.features = FeatureSnapshot {
        prettier,
        eslint,
        editorconfig: !options.no_editorconfig,
        database: create.template.database(),
    };
    create.skip_install = options.skip_install;
    create.enable_git = options.enable_git;

    let templates_root = config.templates_dir(options.templates_dir.as_deref());
    tracing::debug!("Using templates from {}", templates_root.display());
    let creator = ProjectCreator::from_config(config, templates_root)?;

    let spinner = create_spinner(&format!(
        "Creating {} from the {} template...",
        create.project_name,
        create.template.title()
    ));
    let result = creator.create(&create).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            print_success(&report, &directory, create.package_manager);
            Ok(())
        }
        Err(e) => {
            if e.rolled_back {
                eprintln!(
                    "{} Removed partially created project {}",
                    style("→").dim(),
                    create.root.display()
                );
            }
            Err(e.into())
        }
    }
}

fn prompt_template(theme: &ColorfulTheme) -> Result<TemplateVariant> {
    let items: Vec<String> = TemplateVariant::all()
        .iter()
        .map(|v| format!("{} - {}", v.title(), v.description()))
        .collect();
    let index = Select::with_theme(theme)
        .with_prompt("Choose a template")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(TemplateVariant::all()[index])
}

fn prompt_package_manager(theme: &ColorfulTheme) -> Result<PackageManager> {
    let items: Vec<&str> = PackageManager::all().iter().map(|pm| pm.command()).collect();
    let index = Select::with_theme(theme)
        .with_prompt("Choose a package manager")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(PackageManager::all()[index])
}

fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn print_success(report: &CreateReport, directory: &str, package_manager: PackageManager) {
    println!(
        "{} Created {} in {}",
        style("✓").green(),
        style(&report.project_name).bold(),
        report.root.display()
    );
    println!("  Files copied: {}", report.files_copied);
    if report.git_initialized {
        println!("  {} Initialized git repository", style("✓").green());
    }
    if report.dependencies_installed {
        println!("  {} Installed dependencies", style("✓").green());
    }
    for warning in &report.warnings {
        println!("  {} {}", style("⚠").yellow(), warning);
    }

    println!(
        "\n{} Rename {} to {} and fill in your credentials. See README.md for more information.",
        style("Note:").yellow(),
        style(".env.template").cyan(),
        style(".env").cyan()
    );

    println!("\n{}", style("Next steps:").bold());
    println!("  cd {}", directory);
    println!("  {}", style(package_manager.dev_command()).cyan());
}
