//! End-to-end self test: every controller operation once, in order.
//!
//! Ticket, login, session info, zones, clients, then logout and ticket
//! release. The last two always run once the credentials exist.

use serde::Serialize;
use tracing::{info, warn};

use zonesync_core::{
    ClientQuery, ClientStore, ControllerClient, CoreError, Credential, LoginSession, SessionInfo, SyncEngine,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, Envelope};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FlowReport {
    controller_version: Option<String>,
    session: SessionInfo,
    zone_count: u64,
    client_count: u64,
}

pub async fn handle<S: ClientStore>(
    engine: &SyncEngine<S>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = engine.client();

    let ticket = client.create_ticket().await.map_err(CoreError::from)?;
    info!("flow: ticket created");

    let session = match client.login().await {
        Ok(s) => s,
        Err(e) => {
            release_ticket(client, &ticket).await;
            return Err(CoreError::from(e).into());
        }
    };
    info!("flow: logged in");

    let query = engine.config().client_query();
    let report = run_steps(client, &ticket, &session, &query).await;

    if let Err(e) = client.logout(&session.cookie).await {
        warn!(error = %e, "flow: logout failed");
    }
    release_ticket(client, &ticket).await;

    let report = report?;
    let out = output::render(
        global.output,
        &Envelope::ok(report).with_message("Flow completed"),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn run_steps(
    client: &ControllerClient,
    ticket: &Credential,
    session: &LoginSession,
    query: &ClientQuery,
) -> Result<FlowReport, CoreError> {
    let info = client.session_info(&session.cookie).await?;
    let zones = client.list_zones(ticket).await?;
    let clients = client.list_clients(ticket, query).await?;
    info!(zones = zones.total_count, clients = clients.total_count, "flow: lists fetched");

    Ok(FlowReport {
        controller_version: session.profile.controller_version.clone(),
        session: info,
        zone_count: zones.total_count,
        client_count: clients.total_count,
    })
}

async fn release_ticket(client: &ControllerClient, ticket: &Credential) {
    if let Err(e) = client.delete_ticket(ticket).await {
        warn!(error = %e, "flow: ticket release failed");
    }
}
