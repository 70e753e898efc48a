//! @acp:module "Rules Command"
//! @acp:summary "Print the active rule table"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Prints the active rule table as JSON.

use anyhow::Result;

use crate::config::ScaffoldConfig;

/// Execute the rules command
pub fn execute_rules(config: &ScaffoldConfig) -> Result<()> {
    let table = config.rule_table()?;
    println!("{}", table.to_json()?);
    Ok(())
}
