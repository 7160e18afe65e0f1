//! Client command handlers.

use tabled::Tabled;

use zonesync_core::{ClientRecord, ClientStore, CoreError, RawClient, SyncEngine};

use crate::cli::{ClientsArgs, ClientsCommand, CredentialOpt, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Envelope};

use super::util;

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct RecordRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Bytes")]
    total_bytes: u64,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

impl From<&ClientRecord> for RecordRow {
    fn from(c: &ClientRecord) -> Self {
        Self {
            mac: c.mac.to_string(),
            hostname: c.hostname.clone().unwrap_or_default(),
            ip: c.ip_address.clone().unwrap_or_default(),
            ssid: c.ssid.clone().unwrap_or_default(),
            status: c.status.to_string(),
            total_bytes: c.total_bytes,
            last_seen: c.last_seen.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Tabled)]
struct RawRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "AP")]
    ap_mac: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&RawClient> for RawRow {
    fn from(c: &RawClient) -> Self {
        Self {
            mac: c.client_mac.clone().unwrap_or_default(),
            hostname: c.hostname.clone().unwrap_or_default(),
            ip: c.ip_address.clone().unwrap_or_default(),
            ap_mac: c.ap_mac.clone().unwrap_or_default(),
            status: c.status.clone().unwrap_or_default(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────

pub async fn handle<S: ClientStore>(
    engine: &SyncEngine<S>,
    args: ClientsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = match args.command {
        ClientsCommand::Fetch { sync, credential } => fetch(engine, sync, &credential, global).await?,

        ClientsCommand::Disconnect { mac, ap_mac } => {
            let target = util::disconnect_target(&mac, &ap_mac)?;
            engine.disconnect(&target).await?;
            output::render(
                global.output,
                &Envelope::done(format!("Disconnected {}", target.mac)),
            )
        }

        ClientsCommand::BulkDisconnect { targets } => {
            let targets = targets
                .iter()
                .map(|raw| util::parse_target(raw))
                .collect::<Result<Vec<_>, _>>()?;
            engine.bulk_disconnect(&targets).await?;
            output::render(
                global.output,
                &Envelope::done(format!("Disconnected {} clients", targets.len())),
            )
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn fetch<S: ClientStore>(
    engine: &SyncEngine<S>,
    sync: bool,
    credential: &CredentialOpt,
    global: &GlobalOpts,
) -> Result<String, CliError> {
    let explicit = util::explicit_credential(credential);

    if sync {
        let outcome = match explicit {
            Some(c) => {
                let query = engine.config().client_query();
                let list = engine
                    .client()
                    .list_clients(&c, &query)
                    .await
                    .map_err(CoreError::from)?;
                engine.merge(list.clients).await?
            }
            None => engine.sync_clients().await?,
        };
        let envelope = Envelope::ok(outcome);
        return Ok(output::render_list(global.output, &envelope, || {
            envelope.payload.clients.iter().map(RecordRow::from).collect()
        }));
    }

    let list = match explicit {
        Some(c) => {
            let query = engine.config().client_query();
            engine
                .client()
                .list_clients(&c, &query)
                .await
                .map_err(CoreError::from)?
        }
        None => engine.fetch_clients().await?,
    };
    let envelope = Envelope::ok(list);
    Ok(output::render_list(global.output, &envelope, || {
        envelope.payload.clients.iter().map(RawRow::from).collect()
    }))
}
