//! Command dispatch: bridges CLI args -> controller calls -> output formatting.

pub mod cache;
pub mod config_cmd;
pub mod dashboard;
pub mod domains;
pub mod resolvers;
pub mod stats;
pub mod util;

use dnsward_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a filter-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Dashboard => dashboard::handle(controller, global).await,
        Command::Stats => stats::handle(controller, global).await,
        Command::Cache => cache::handle(controller, global).await,
        Command::Resolvers => resolvers::handle(controller, global).await,
        Command::Domains(args) => domains::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
