// ACS ACL endpoints
//
// ACL rids routinely contain `/`, so every path segment built here goes
// through `escape_id`.

use serde_json::{Value, json};
use tracing::debug;

use crate::client::AcsClient;
use crate::error::Error;
use crate::models::AclPermissions;
use crate::path::escape_id;

/// Which kind of principal an ACL grant targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal<'a> {
    User(&'a str),
    Group(&'a str),
}

impl Principal<'_> {
    fn segment(&self) -> String {
        match self {
            Self::User(uid) => format!("users/{}", escape_id(uid)),
            Self::Group(gid) => format!("groups/{}", escape_id(gid)),
        }
    }
}

impl AcsClient {
    /// List all ACLs as the raw response body.
    ///
    /// `GET /acs/api/v1/acls`
    pub async fn acls_raw(&self) -> Result<String, Error> {
        let url = self.acs_url("acls")?;
        debug!("listing acls");
        self.get_text(url).await
    }

    /// Users and groups holding grants on an ACL.
    ///
    /// `GET /acs/api/v1/acls/{rid}/permissions`
    pub async fn acl_permissions(&self, rid: &str) -> Result<AclPermissions, Error> {
        let url = self.acs_url(&format!("acls/{}/permissions", escape_id(rid)))?;
        self.get_json(url).await
    }

    /// Read the value of one action a principal holds on an ACL.
    ///
    /// `GET /acs/api/v1/acls/{rid}/{users|groups}/{id}/{action}`
    pub async fn acl_action(
        &self,
        rid: &str,
        principal: Principal<'_>,
        action: &str,
    ) -> Result<Value, Error> {
        let url = self.acs_url(&format!(
            "acls/{}/{}/{}",
            escape_id(rid),
            principal.segment(),
            escape_id(action)
        ))?;
        self.get_json(url).await
    }

    /// Create an ACL.
    ///
    /// `PUT /acs/api/v1/acls/{rid}` with `{"description": ..}`.
    pub async fn create_acl(&self, rid: &str, description: &str) -> Result<(), Error> {
        let url = self.acs_url(&format!("acls/{}", escape_id(rid)))?;
        debug!(rid, "creating acl");
        self.put_json(url, &json!({ "description": description }))
            .await
    }

    /// Update an existing ACL's description.
    ///
    /// `PATCH /acs/api/v1/acls/{rid}`
    pub async fn update_acl(&self, rid: &str, description: &str) -> Result<(), Error> {
        let url = self.acs_url(&format!("acls/{}", escape_id(rid)))?;
        debug!(rid, "updating acl");
        self.patch_json(url, &json!({ "description": description }))
            .await
    }

    /// Grant an action on an ACL to a user or group.
    ///
    /// `PUT /acs/api/v1/acls/{rid}/{users|groups}/{id}/{action}`
    pub async fn grant_acl_action(
        &self,
        rid: &str,
        principal: Principal<'_>,
        action: &str,
    ) -> Result<(), Error> {
        let url = self.acs_url(&format!(
            "acls/{}/{}/{}",
            escape_id(rid),
            principal.segment(),
            escape_id(action)
        ))?;
        debug!(rid, ?principal, action, "granting acl action");
        self.put_empty(url).await
    }
}
