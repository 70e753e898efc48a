#![forbid(unsafe_code)]

//! @acp:module "create-fastymini Library"
//! @acp:summary "Template materialization and project scaffolding"
//! @acp:domain cli
//! @acp:layer api
//!
//! # create-fastymini
//!
//! Scaffolds Fastify + TypeScript projects from a static template tree.
//!
//! ## Features
//!
//! - **Rule table**: declarative, JSON-serializable file rules
//! - **Materialization**: idempotent rename/remove per feature flag
//! - **Descriptor transform**: order-preserving `package.json` trimming
//! - **Rollback**: a failed creation leaves no project directory behind
//!
//! ## Example
//!
//! ```rust,no_run
//! use fastymini::{CreateOptions, FeatureSnapshot, ProjectCreator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let creator = ProjectCreator::new("templates");
//!
//!     let mut options = CreateOptions::new("my-api", &std::env::current_dir()?);
//!     options.features = FeatureSnapshot {
//!         eslint: true,
//!         editorconfig: true,
//!         ..FeatureSnapshot::default()
//!     };
//!     options.skip_install = true;
//!
//!     let report = creator.create(&options).await?;
//!     println!("created {}", report.root.display());
//!
//!     Ok(())
//! }
//! ```

pub mod check;
pub mod commands;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod fsutil;
pub mod materialize;
pub mod plugins;
pub mod project;
pub mod rules;
pub mod templates;

// Re-exports
pub use check::{CheckReport, Finding, FindingKind, TemplateChecker};
pub use config::{InstallFailurePolicy, PackageManager, ScaffoldConfig};
pub use descriptor::{transform_package_descriptor, DescriptorSettings, PackageDescriptor};
pub use error::{Result, ScaffoldError};
pub use materialize::{materialize, MaterializeReport, Materializer, RuleAction};
pub use plugins::{MongoosePlugin, Plugin, PluginRegistry};
pub use project::{CreateError, CreateOptions, CreateReport, Installer, ProjectCreator, Stage};
pub use rules::{
    Condition, Database, FeatureSnapshot, InactiveAction, Rule, RuleTable, Strictness,
    TemplateMapping,
};
pub use templates::TemplateVariant;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
