// ACS user endpoints
//
// Listing, per-user memberships and permissions, and account creation.
// The listing is returned as raw text so callers can persist exactly what
// the cluster sent.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::AcsClient;
use crate::error::Error;
use crate::models::{GroupMembership, List, Permission, PermissionsEnvelope, User};
use crate::path::escape_id;

/// How a recreated account proves its identity.
#[derive(Debug, Clone, Copy)]
pub enum UserCredential<'a> {
    /// Regular account with a password.
    Password(&'a SecretString),
    /// Service account with a shared secret.
    Secret(&'a SecretString),
    /// Service account with a PEM public key.
    PublicKey(&'a str),
}

impl AcsClient {
    /// List all users and service accounts as the raw response body.
    ///
    /// `GET /acs/api/v1/users`
    pub async fn users_raw(&self) -> Result<String, Error> {
        let url = self.acs_url("users")?;
        debug!("listing users");
        self.get_text(url).await
    }

    /// A single account.
    ///
    /// `GET /acs/api/v1/users/{uid}`
    pub async fn user(&self, uid: &str) -> Result<User, Error> {
        let url = self.acs_url(&format!("users/{}", escape_id(uid)))?;
        debug!(uid, "reading user");
        self.get_json(url).await
    }

    /// Groups a user belongs to.
    ///
    /// `GET /acs/api/v1/users/{uid}/groups`
    pub async fn user_groups(&self, uid: &str) -> Result<Vec<GroupMembership>, Error> {
        let url = self.acs_url(&format!("users/{}/groups", escape_id(uid)))?;
        let list: List<GroupMembership> = self.get_json(url).await?;
        Ok(list.array)
    }

    /// Permissions held directly by a user.
    ///
    /// `GET /acs/api/v1/users/{uid}/permissions`
    pub async fn user_permissions(&self, uid: &str) -> Result<Vec<Permission>, Error> {
        let url = self.acs_url(&format!("users/{}/permissions", escape_id(uid)))?;
        let envelope: PermissionsEnvelope = self.get_json(url).await?;
        Ok(envelope.into_permissions())
    }

    /// Create a user or service account.
    ///
    /// `PUT /acs/api/v1/users/{uid}` with the description and one of
    /// `password`, `secret` or `public_key`. Answers 409 if the uid already exists.
    pub async fn create_user(
        &self,
        uid: &str,
        description: &str,
        credential: UserCredential<'_>,
    ) -> Result<(), Error> {
        let url = self.acs_url(&format!("users/{}", escape_id(uid)))?;
        debug!(uid, "creating user");
        let body = match credential {
            UserCredential::Password(password) => json!({
                "description": description,
                "password": password.expose_secret(),
            }),
            UserCredential::Secret(secret) => json!({
                "description": description,
                "secret": secret.expose_secret(),
            }),
            UserCredential::PublicKey(key) => json!({
                "description": description,
                "public_key": key,
            }),
        };
        self.put_json(url, &body).await
    }

    /// Update an existing user's description.
    ///
    /// `PATCH /acs/api/v1/users/{uid}`
    pub async fn update_user(&self, uid: &str, description: &str) -> Result<(), Error> {
        let url = self.acs_url(&format!("users/{}", escape_id(uid)))?;
        debug!(uid, "updating user");
        self.patch_json(url, &json!({ "description": description }))
            .await
    }
}
