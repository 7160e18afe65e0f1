//! Command dispatch: one CLI command onto one engine operation.

pub mod clients;
pub mod config_cmd;
pub mod flow;
pub mod session;
pub mod store;
pub mod util;
pub mod watch;
pub mod zones;

use zonesync_core::{ClientStore, SyncEngine};

use crate::cli::{ClientsCommand, Command, GlobalOpts};
use crate::error::CliError;

/// Whether the command writes to the local client store.
pub fn persists(cmd: &Command) -> bool {
    matches!(
        cmd,
        Command::Watch(_)
            | Command::Clients(crate::cli::ClientsArgs {
                command: ClientsCommand::Fetch { sync: true, .. }
            })
    )
}

/// Dispatch a controller-bound command to the appropriate handler.
pub async fn dispatch<S: ClientStore>(
    cmd: Command,
    engine: &SyncEngine<S>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Ticket(args) => session::handle_ticket(engine, args, global).await,
        Command::Session(args) => session::handle_session(engine, args, global).await,
        Command::Zones(args) => zones::handle(engine, &args, global).await,
        Command::Clients(args) => clients::handle(engine, args, global).await,
        Command::Watch(args) => watch::handle(engine, &args).await,
        Command::Flow => flow::handle(engine, global).await,
        // Handled before a controller is configured
        Command::Config(_) | Command::Store(_) | Command::Completions(_) => Ok(()),
    }
}
