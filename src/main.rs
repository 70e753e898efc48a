#![forbid(unsafe_code)]
//! create-fastymini Command Line Interface

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fastymini::commands::{
    execute_check, execute_new, execute_restore, execute_rules, execute_templatize, CheckOptions,
    NewOptions, RenameOptions,
};
use fastymini::config::{PackageManager, ScaffoldConfig, DEFAULT_CONFIG_FILE};
use fastymini::templates::TemplateVariant;

#[derive(Parser)]
#[command(name = "create-fastymini")]
#[command(about = "Scaffold a Fastify + TypeScript project from a template")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project
    New {
        /// Project directory (prompted when omitted)
        directory: Option<String>,

        /// Template to use (default, mongo-crud, mongo-crud-vitest)
        #[arg(short, long)]
        template: Option<String>,

        /// Initialize with ESLint config
        #[arg(long, overrides_with = "no_eslint")]
        eslint: bool,

        /// Initialize without ESLint config
        #[arg(long, overrides_with = "eslint")]
        no_eslint: bool,

        /// Initialize with Prettier config
        #[arg(long, overrides_with = "no_prettier")]
        prettier: bool,

        /// Initialize without Prettier config
        #[arg(long, overrides_with = "prettier")]
        no_prettier: bool,

        /// Do not create an .editorconfig file
        #[arg(long)]
        no_editorconfig: bool,

        /// Package manager to use (npm, yarn, pnpm)
        #[arg(long)]
        package_manager: Option<String>,

        /// Skip installing packages
        #[arg(long)]
        skip_install: bool,

        /// Initialize a git repository
        #[arg(long)]
        enable_git: bool,

        /// Template root directory
        #[arg(long, env = "FASTYMINI_TEMPLATES_DIR")]
        templates_dir: Option<PathBuf>,

        /// Skip interactive prompts (use defaults + CLI args)
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Check template variants against the rule table
    Check {
        /// Variants to check (default: all)
        variants: Vec<String>,

        /// Template root directory
        #[arg(long, env = "FASTYMINI_TEMPLATES_DIR")]
        templates_dir: Option<PathBuf>,
    },

    /// Print the active rule table as JSON
    Rules,

    /// Rename config files to their template-marked names
    Templatize {
        /// Directory to rename in place
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Rename template-marked files back to their canonical names
    Restore {
        /// Directory to rename in place
        #[arg(default_value = ".")]
        root: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", style("✗").red(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load config
    let config = if cli.config.exists() {
        ScaffoldConfig::load(&cli.config)?
    } else {
        ScaffoldConfig::default()
    };

    match cli.command {
        Commands::New {
            directory,
            template,
            eslint,
            no_eslint,
            prettier,
            no_prettier,
            no_editorconfig,
            package_manager,
            skip_install,
            enable_git,
            templates_dir,
            yes,
        } => {
            let template = template
                .map(|t| t.parse::<TemplateVariant>())
                .transpose()
                .context("Invalid --template")?;
            let package_manager = package_manager
                .map(|pm| pm.parse::<PackageManager>())
                .transpose()
                .map_err(|e: String| anyhow::anyhow!(e))?;

            let options = NewOptions {
                directory,
                template,
                eslint: flag_pair(eslint, no_eslint),
                prettier: flag_pair(prettier, no_prettier),
                no_editorconfig,
                package_manager,
                skip_install,
                enable_git,
                templates_dir,
                yes,
            };
            execute_new(options, &config).await?;
        }

        Commands::Check {
            variants,
            templates_dir,
        } => {
            let options = CheckOptions {
                templates_dir,
                variants,
            };
            execute_check(options, &config)?;
        }

        Commands::Rules => {
            execute_rules(&config)?;
        }

        Commands::Templatize { root } => {
            execute_templatize(RenameOptions { root }, &config)?;
        }

        Commands::Restore { root } => {
            execute_restore(RenameOptions { root }, &config)?;
        }
    }

    Ok(())
}

/// `--x` / `--no-x` to an optional answer; neither means "ask"
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

/// Initialize tracing on stderr; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
