//! Command dispatch and handler modules.

mod catalog;
mod resolve;
mod select;

use condor_core::config::GlobalConfig;
use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli, config: &GlobalConfig) -> Result<()> {
    match cli.command {
        Command::Resolve { file, why } => resolve::exec(&file, why.as_deref()),
        Command::Select { file, elements } => select::exec(&file, &elements, config),
        Command::Catalog { file } => catalog::exec(&file),
    }
}
