//! @acp:module "Check Command"
//! @acp:summary "Check the shipped template variants"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `create-fastymini check` over the shipped template variants.

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use crate::check::{discover_variants, FindingKind, TemplateChecker};
use crate::config::ScaffoldConfig;
use crate::plugins::PluginRegistry;

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Template root override
    pub templates_dir: Option<PathBuf>,
    /// Variants to check (all discovered variants when empty)
    pub variants: Vec<String>,
}

/// Execute the check command
pub fn execute_check(options: CheckOptions, config: &ScaffoldConfig) -> Result<()> {
    let templates_root = config.templates_dir(options.templates_dir.as_deref());
    let variants = if options.variants.is_empty() {
        discover_variants(&templates_root)
            .with_context(|| format!("Failed to list variants in {}", templates_root.display()))?
    } else {
        options.variants
    };

    let rules = config.rule_table()?;
    let plugins = PluginRegistry::builtin();
    let report = TemplateChecker::new(&rules, &plugins)?.check(&templates_root, &variants);

    println!(
        "{} Checking {} variant(s) in {}",
        style("→").cyan(),
        report.variants_checked.len(),
        templates_root.display()
    );

    for finding in &report.findings {
        match &finding.kind {
            FindingKind::MissingRequired { source } => println!(
                "  {} [{}] missing required file {}",
                style("✗").red(),
                finding.variant,
                source
            ),
            FindingKind::MissingVariant => println!(
                "  {} [{}] variant directory not found",
                style("✗").red(),
                finding.variant
            ),
            FindingKind::Unregistered { path } => println!(
                "  {} [{}] {} is not handled by any rule or plugin",
                style("⚠").yellow(),
                finding.variant,
                path
            ),
        }
    }

    let errors = report.errors().count();
    let warnings = report.warnings().count();
    if errors > 0 {
        anyhow::bail!("{} error(s), {} warning(s)", errors, warnings);
    }

    println!(
        "{} Templates are consistent ({} warning(s))",
        style("✓").green(),
        warnings
    );
    Ok(())
}
