//! Command handlers.

pub mod config_cmd;
pub mod links;
pub mod open;
pub mod stats;
pub mod util;

use linkseal_core::LinkService;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a parsed command to its handler.
pub async fn dispatch(
    command: Command,
    service: &LinkService,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match command {
        Command::Create(args) => links::create(service, args, global).await,
        Command::Upload(args) => links::upload(service, args, global).await,
        Command::Revoke(args) => links::revoke(service, args, global).await,
        Command::Open(args) => open::handle(service, args, global).await,
        Command::Stats(args) => stats::handle(service, args, global).await,
        // Config and completions are handled before a service is built.
        Command::Config(_) | Command::Completions(_) => {
            unreachable!("handled in main")
        }
    }
}
