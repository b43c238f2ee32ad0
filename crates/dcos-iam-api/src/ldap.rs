// ACS directory (LDAP) configuration endpoints

use serde_json::Value;
use tracing::debug;

use crate::client::AcsClient;
use crate::error::Error;

impl AcsClient {
    /// Fetch the directory backend configuration as the raw response body.
    ///
    /// `GET /acs/api/v1/ldap/config`. Answers 404 when no directory is set up.
    pub async fn ldap_config_raw(&self) -> Result<String, Error> {
        let url = self.acs_url("ldap/config")?;
        debug!("fetching ldap config");
        self.get_text(url).await
    }

    /// Replace the directory backend configuration.
    ///
    /// `PUT /acs/api/v1/ldap/config`
    pub async fn put_ldap_config(&self, config: &Value) -> Result<(), Error> {
        let url = self.acs_url("ldap/config")?;
        debug!("updating ldap config");
        self.put_json(url, config).await
    }
}
