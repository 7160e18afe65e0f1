//! Ticket and session command handlers.
//!
//! `ticket create` and `session login` bypass the session cache: the
//! credential they print must outlive this process.

use serde::Serialize;

use zonesync_core::{ClientStore, CoreError, Credential, LoginProfile, SessionInfo, SyncEngine};

use crate::cli::{GlobalOpts, SessionArgs, SessionCommand, TicketArgs, TicketCommand};
use crate::error::CliError;
use crate::output::{self, Envelope};

use super::util;

#[derive(Serialize)]
struct TicketPayload<'a> {
    ticket: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginPayload<'a> {
    cookie: &'a str,
    #[serde(flatten)]
    profile: &'a LoginProfile,
}

#[derive(Serialize)]
struct SessionPayload {
    session: SessionInfo,
}

pub async fn handle_ticket<S: ClientStore>(
    engine: &SyncEngine<S>,
    args: TicketArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = engine.client();
    let out = match args.command {
        TicketCommand::Create => {
            let ticket = client.create_ticket().await.map_err(CoreError::from)?;
            output::render(
                global.output,
                &Envelope::ok(TicketPayload {
                    ticket: ticket.expose(),
                }),
            )
        }
        TicketCommand::Delete { ticket } => {
            client
                .delete_ticket(&Credential::ticket(ticket.trim()))
                .await
                .map_err(CoreError::from)?;
            output::render(global.output, &Envelope::done("Ticket deleted"))
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle_session<S: ClientStore>(
    engine: &SyncEngine<S>,
    args: SessionArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = engine.client();
    let out = match args.command {
        SessionCommand::Login => {
            let session = client.login().await.map_err(CoreError::from)?;
            output::render(
                global.output,
                &Envelope::ok(LoginPayload {
                    cookie: session.cookie.expose(),
                    profile: &session.profile,
                }),
            )
        }

        SessionCommand::Info(credential) => {
            let session = match util::explicit_credential(&credential) {
                Some(c) => client.session_info(&c).await.map_err(CoreError::from)?,
                None => engine.session_info().await?,
            };
            output::render(global.output, &Envelope::ok(SessionPayload { session }))
        }

        SessionCommand::Logout { cookie } => {
            client
                .logout(&Credential::cookie(cookie.trim()))
                .await
                .map_err(CoreError::from)?;
            output::render(global.output, &Envelope::done("Logged out"))
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
