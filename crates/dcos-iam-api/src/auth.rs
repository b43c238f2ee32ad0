// ACS authentication
//
// Username/password login against the identity service. The reply carries
// a bearer token that every later request presents as
// `Authorization: token=<token>`.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::AcsClient;
use crate::error::Error;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

impl AcsClient {
    /// Authenticate with the cluster using a uid and password.
    ///
    /// `POST /acs/api/v1/auth/login` with `{"uid": .., "password": ..}`.
    /// On success the returned token is also installed on this client.
    /// Any non-2xx status, unreadable body, or a reply without a token is
    /// reported as [`Error::Authentication`].
    pub async fn login(&self, uid: &str, password: &SecretString) -> Result<SecretString, Error> {
        let url = self.acs_url("auth/login")?;

        debug!("logging in at {}", url);

        let body = json!({
            "uid": uid,
            "password": password.expose_secret(),
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Authentication {
                message: format!("login request failed: {e}"),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        let reply: LoginResponse = resp.json().await.map_err(|e| Error::Authentication {
            message: format!("login reply is not valid JSON: {e}"),
        })?;

        let token = reply
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Authentication {
                message: "login reply carried no token".into(),
            })?;

        let token = SecretString::from(token);
        self.set_token(token.clone());

        debug!("login successful");
        Ok(token)
    }
}
