//! Local store queries. No controller involved.

use serde::Serialize;

use zonesync_core::{ClientRecord, ClientStore, JsonFileStore, StoreQuery};

use crate::cli::{GlobalOpts, StoreArgs, StoreCommand, StoreListArgs};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Envelope};

use super::clients::RecordRow;
use super::util;

#[derive(Serialize)]
struct RecordPayload {
    client: ClientRecord,
}

impl From<StoreListArgs> for StoreQuery {
    fn from(args: StoreListArgs) -> Self {
        Self {
            ssid: args.ssid,
            status: args.status,
            mac: args.mac,
            search: args.search,
            sort: args.sort,
            order: args.order,
            page: args.page,
            limit: args.limit,
        }
    }
}

pub async fn handle(args: StoreArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = JsonFileStore::open(config::store_path(global)?).await?;

    let out = match args.command {
        StoreCommand::List(list) => {
            let page = store.find(&StoreQuery::from(list)).await?;
            let envelope = Envelope::ok(page);
            output::render_list(global.output, &envelope, || {
                envelope.payload.clients.iter().map(RecordRow::from).collect()
            })
        }

        StoreCommand::Get { mac } => {
            let key = util::parse_mac("mac", &mac)?;
            let client = store.get(&key).await?.ok_or_else(|| CliError::NotFound {
                resource_type: "client".into(),
                identifier: key.to_string(),
                list_command: "store list".into(),
            })?;
            output::render(global.output, &Envelope::ok(RecordPayload { client }))
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
