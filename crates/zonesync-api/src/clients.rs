// Wireless client endpoints
//
// Listing via the query API (`/query/client`) and disconnects via
// `/clients/disconnect` and `/clients/bulkDisconnect`.

use tracing::{debug, warn};

use crate::auth::Credential;
use crate::client::ControllerClient;
use crate::error::Error;
use crate::models::{
    BulkDisconnectRequest, ClientList, ClientListResponse, ClientQuery, DisconnectTarget,
};

/// Upper bound on follow-up pages for one client listing.
const MAX_CLIENT_PAGES: u32 = 100;

impl ControllerClient {
    /// List connected clients matching `query`.
    ///
    /// `POST /query/client` with `{"filters": [...], "fullTextSearch": {...}}`
    ///
    /// While the controller reports `hasMore`, the following pages are
    /// fetched and appended. A query that pins `page` gets only that page.
    pub async fn list_clients(
        &self,
        credential: &Credential,
        query: &ClientQuery,
    ) -> Result<ClientList, Error> {
        let mut list = self.query_clients(credential, query).await?;
        if query.page.is_some() {
            return Ok(list);
        }

        let mut page: u32 = 1;
        while list.has_more {
            if page >= MAX_CLIENT_PAGES {
                warn!(
                    pages = page,
                    fetched = list.clients.len(),
                    total = list.total_count,
                    "client list truncated"
                );
                break;
            }
            page += 1;
            let next = ClientQuery {
                page: Some(page),
                ..query.clone()
            };
            let more = self.query_clients(credential, &next).await?;
            if more.clients.is_empty() {
                warn!(page, total = list.total_count, "controller reported more clients but sent none");
                list.has_more = false;
                break;
            }
            list.has_more = more.has_more;
            list.clients.extend(more.clients);
        }

        debug!(
            returned = list.clients.len(),
            total = list.total_count,
            pages = page,
            "client query answered"
        );
        Ok(list)
    }

    async fn query_clients(
        &self,
        credential: &Credential,
        query: &ClientQuery,
    ) -> Result<ClientList, Error> {
        let url = self.endpoint("query/client")?;
        debug!(filters = query.filters.len(), page = ?query.page, "querying connected clients");
        let resp: ClientListResponse = self
            .send_json(Self::authorize(self.http().post(url).json(query), credential))
            .await?;
        Ok(ClientList::from(resp))
    }

    /// Disconnect one client from its AP.
    ///
    /// `POST /clients/disconnect` with `{"mac", "apMac"}`
    pub async fn disconnect_client(
        &self,
        credential: &Credential,
        target: &DisconnectTarget,
    ) -> Result<(), Error> {
        let url = self.endpoint("clients/disconnect")?;
        debug!(mac = %target.mac, ap_mac = %target.ap_mac, "disconnecting client");
        self.send_unit(Self::authorize(self.http().post(url).json(target), credential))
            .await
    }

    /// Disconnect several clients in one call.
    ///
    /// `POST /clients/bulkDisconnect` with `{"clientList": [{"mac", "apMac"}, ...]}`
    pub async fn bulk_disconnect(
        &self,
        credential: &Credential,
        targets: &[DisconnectTarget],
    ) -> Result<(), Error> {
        let url = self.endpoint("clients/bulkDisconnect")?;
        debug!(count = targets.len(), "bulk disconnecting clients");
        let body = BulkDisconnectRequest {
            client_list: targets,
        };
        self.send_unit(Self::authorize(self.http().post(url).json(&body), credential))
            .await
    }
}
