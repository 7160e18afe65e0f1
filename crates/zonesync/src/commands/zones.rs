//! Zone listing.

use serde::Serialize;
use tabled::Tabled;

use zonesync_core::{ClientStore, CoreError, SyncEngine, Zone};

use crate::cli::{CredentialOpt, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Envelope};

use super::util;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ZonesPayload {
    total_count: u64,
    zones: Vec<Zone>,
}

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&Zone> for ZoneRow {
    fn from(z: &Zone) -> Self {
        Self {
            id: z.id.clone(),
            name: z.name.clone().unwrap_or_default(),
        }
    }
}

pub async fn handle<S: ClientStore>(
    engine: &SyncEngine<S>,
    credential: &CredentialOpt,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let page = match util::explicit_credential(credential) {
        Some(c) => engine
            .client()
            .list_zones(&c)
            .await
            .map_err(CoreError::from)?,
        None => engine.zones().await?,
    };

    let envelope = Envelope::ok(ZonesPayload {
        total_count: page.total_count,
        zones: page.list,
    });
    let out = output::render_list(global.output, &envelope, || {
        envelope.payload.zones.iter().map(ZoneRow::from).collect()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
