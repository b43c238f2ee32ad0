// ACS API HTTP client
//
// Wraps `reqwest::Client` with cluster URL construction, the
// `Authorization: token=...` header and status checking. Endpoint groups
// (users, groups, ACLs, LDAP, cluster) are implemented as inherent methods
// in separate files to keep this module focused on transport mechanics.

use std::sync::{PoisonError, RwLock};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::path::is_dot_segment;
use crate::transport::TransportConfig;

/// Path prefix of the ACS identity service.
pub(crate) const ACS_PREFIX: &str = "acs/api/v1";

/// Longest slice of an error body carried into `Error::Status`.
const ERROR_BODY_PREVIEW: usize = 200;

/// Raw HTTP client for a DC/OS cluster.
///
/// Holds the master base URL and, once logged in, the bearer token. Every
/// request is sent with `Content-Type: application/json` and, when a token
/// is present, `Authorization: token=<token>`.
#[derive(Debug)]
pub struct AcsClient {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
}

impl AcsClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// The `base_url` is the master root, e.g. `http://10.0.0.5/`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            token: RwLock::new(None),
        }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── Token management ─────────────────────────────────────────────

    /// Install a bearer token (from a login or a persisted config).
    pub fn set_token(&self, token: SecretString) {
        debug!("storing auth token");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Whether a token is currently installed.
    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn apply_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header(CONTENT_TYPE, "application/json");
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(token) => builder.header(AUTHORIZATION, format!("token={}", token.expose_secret())),
            None => builder,
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a master-relative path such as `mesos/slaves`.
    ///
    /// Path segments must already be escaped with [`crate::escape_id`].
    /// Dot segments are refused rather than resolved.
    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.split('/').any(is_dot_segment) {
            return Err(Error::InvalidPath {
                path: path.to_owned(),
            });
        }
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Build a URL under the ACS prefix: `{base}/acs/api/v1/{path}`.
    pub(crate) fn acs_url(&self, path: &str) -> Result<Url, Error> {
        self.endpoint(&format!("{ACS_PREFIX}/{}", path.trim_start_matches('/')))
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and return the body text exactly as received.
    pub(crate) async fn get_text(&self, url: Url) -> Result<String, Error> {
        debug!("GET {}", url);

        let resp = self.apply_headers(self.http.get(url)).send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.text().await?)
    }

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let body = self.get_text(url).await?;
        decode(&body)
    }

    /// Send a PUT request with a JSON body.
    pub(crate) async fn put_json(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        debug!("PUT {}", url);

        let resp = self.apply_headers(self.http.put(url)).json(body).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    /// Send a PUT request without a body (membership and permission grants).
    pub(crate) async fn put_empty(&self, url: Url) -> Result<(), Error> {
        debug!("PUT {}", url);

        let resp = self.apply_headers(self.http.put(url)).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    /// Send a PATCH request with a JSON body.
    pub(crate) async fn patch_json(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        debug!("PATCH {}", url);

        let resp = self
            .apply_headers(self.http.patch(url))
            .json(body)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    /// Send a POST request with a JSON body.
    pub(crate) async fn post_json(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        debug!("POST {}", url);

        let resp = self
            .apply_headers(self.http.post(url))
            .json(body)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}

/// Map non-2xx responses into `Error`, passing successful ones through.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    trace!(%status, "response received");

    if status.is_success() {
        return Ok(resp);
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::TokenExpired);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(Error::Status {
        status: status.as_u16(),
        body: preview(&body).to_owned(),
    })
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

fn preview(body: &str) -> &str {
    if body.len() <= ERROR_BODY_PREVIEW {
        return body;
    }
    let mut end = ERROR_BODY_PREVIEW;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
