// ACS group endpoints

use serde_json::json;
use tracing::debug;

use crate::client::AcsClient;
use crate::error::Error;
use crate::models::{List, Permission, PermissionsEnvelope, UserMembership};
use crate::path::escape_id;

impl AcsClient {
    /// List all groups as the raw response body.
    ///
    /// `GET /acs/api/v1/groups`
    pub async fn groups_raw(&self) -> Result<String, Error> {
        let url = self.acs_url("groups")?;
        debug!("listing groups");
        self.get_text(url).await
    }

    /// Members of a group.
    ///
    /// `GET /acs/api/v1/groups/{gid}/users`
    pub async fn group_users(&self, gid: &str) -> Result<Vec<UserMembership>, Error> {
        let url = self.acs_url(&format!("groups/{}/users", escape_id(gid)))?;
        let list: List<UserMembership> = self.get_json(url).await?;
        Ok(list.array)
    }

    /// Permissions held by a group.
    ///
    /// `GET /acs/api/v1/groups/{gid}/permissions`
    pub async fn group_permissions(&self, gid: &str) -> Result<Vec<Permission>, Error> {
        let url = self.acs_url(&format!("groups/{}/permissions", escape_id(gid)))?;
        let envelope: PermissionsEnvelope = self.get_json(url).await?;
        Ok(envelope.into_permissions())
    }

    /// Create a group.
    ///
    /// `PUT /acs/api/v1/groups/{gid}` with `{"description": ..}`.
    pub async fn create_group(&self, gid: &str, description: &str) -> Result<(), Error> {
        let url = self.acs_url(&format!("groups/{}", escape_id(gid)))?;
        debug!(gid, "creating group");
        self.put_json(url, &json!({ "description": description }))
            .await
    }

    /// Update an existing group's description.
    ///
    /// `PATCH /acs/api/v1/groups/{gid}`
    pub async fn update_group(&self, gid: &str, description: &str) -> Result<(), Error> {
        let url = self.acs_url(&format!("groups/{}", escape_id(gid)))?;
        debug!(gid, "updating group");
        self.patch_json(url, &json!({ "description": description }))
            .await
    }

    /// Add a user to a group.
    ///
    /// `PUT /acs/api/v1/groups/{gid}/users/{uid}`
    pub async fn add_group_member(&self, gid: &str, uid: &str) -> Result<(), Error> {
        let url = self.acs_url(&format!(
            "groups/{}/users/{}",
            escape_id(gid),
            escape_id(uid)
        ))?;
        debug!(gid, uid, "adding group member");
        self.put_empty(url).await
    }
}
