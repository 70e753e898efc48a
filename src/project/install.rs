//! @acp:module "Dependency Install"
//! @acp:summary "Run the package manager install step"
//! @acp:domain cli
//! @acp:layer io

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::config::PackageManager;
use crate::error::{Result, ScaffoldError};

/// Program and arguments used for the install step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installer {
    pub program: String,
    pub args: Vec<String>,
}

impl Installer {
    pub fn for_package_manager(manager: PackageManager) -> Self {
        Self {
            program: manager.command().to_string(),
            args: vec!["install".to_string()],
        }
    }

    fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the installer inside `project_root`
    pub async fn run(&self, project_root: &Path) -> Result<()> {
        let command = self.display();
        tracing::info!("Running `{}` in {}", command, project_root.display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(project_root)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ScaffoldError::Command {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.trim().to_string())
            .unwrap_or_else(|| output.status.to_string());
        Err(ScaffoldError::Command { command, message })
    }
}
