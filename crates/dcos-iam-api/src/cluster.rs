// Mesos and Marathon endpoints
//
// Agents are read from the Mesos master; service groups from Marathon.
// Neither lives under the ACS prefix.

use tracing::debug;

use crate::client::AcsClient;
use crate::error::Error;
use crate::models::ServiceGroup;

impl AcsClient {
    /// List Mesos agents as the raw response body.
    ///
    /// `GET /mesos/slaves`
    pub async fn agents_raw(&self) -> Result<String, Error> {
        let url = self.endpoint("mesos/slaves")?;
        debug!("listing agents");
        self.get_text(url).await
    }

    /// Fetch the Marathon group tree as the raw response body.
    ///
    /// `GET /marathon/v2/groups`
    pub async fn service_groups_raw(&self) -> Result<String, Error> {
        let url = self.endpoint("marathon/v2/groups")?;
        debug!("fetching service groups");
        self.get_text(url).await
    }

    /// Create a Marathon group (with its nested groups).
    ///
    /// `POST /marathon/v2/groups`. Answers 409 if the id already exists.
    pub async fn create_service_group(&self, group: &ServiceGroup) -> Result<(), Error> {
        let url = self.endpoint("marathon/v2/groups")?;
        debug!(id = %group.id, "creating service group");
        self.post_json(url, group).await
    }
}
