// Zone endpoints

use tracing::debug;

use crate::auth::Credential;
use crate::client::ControllerClient;
use crate::error::Error;
use crate::models::{ListPage, Zone};

impl ControllerClient {
    /// List the zones visible to the credential.
    ///
    /// `GET /rkszones`
    pub async fn list_zones(&self, credential: &Credential) -> Result<ListPage<Zone>, Error> {
        let url = self.endpoint("rkszones")?;
        debug!("listing zones");
        self.send_json(Self::authorize(self.http().get(url), credential))
            .await
    }
}
