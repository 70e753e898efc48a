//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! CLI command implementations, one submodule per subcommand.

pub mod check;
pub mod new;
pub mod rules;
pub mod templatize;

pub use check::{execute_check, CheckOptions};
pub use new::{execute_new, NewOptions, DEFAULT_PROJECT_NAME};
pub use rules::execute_rules;
pub use templatize::{execute_restore, execute_templatize, RenameOptions};
