// ── Runtime session configuration ──
//
// These types describe *how* to reach a cluster and how to replay data
// onto it. They carry credential data and tuning, but never touch disk.
// The binary builds a `SessionConfig` from the config file and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use dcos_iam_api::{AcsClient, TlsMode, TransportConfig};
use secrecy::SecretString;
use tracing::info;
use url::Url;

use crate::error::CoreError;

/// Everything needed to talk to one cluster.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Master base URL (e.g. `http://10.0.0.5/`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// A token from an earlier login, if any.
    pub token: Option<SecretString>,
    pub tls: TlsMode,
    pub timeout: Duration,
    pub data_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub defaults: PublishDefaults,
    pub sync: SyncOptions,
}

impl SessionConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }

    /// A new snapshot carrying `token`; `self` is left unchanged.
    pub fn with_token(&self, token: SecretString) -> Self {
        Self {
            token: Some(token),
            ..self.clone()
        }
    }
}

/// Credentials given to accounts recreated on the target cluster.
///
/// Passwords are never part of an IAM export, so every restored account
/// gets one of these.
#[derive(Debug, Clone)]
pub struct PublishDefaults {
    /// Password for regular users.
    pub user_password: SecretString,
    /// Secret for service accounts that carry no public key.
    pub user_secret: SecretString,
}

/// Tuning for bulk passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Requests in flight per relationship pass. 1 is strictly sequential.
    pub concurrency: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

impl SyncOptions {
    pub(crate) fn width(self) -> usize {
        self.concurrency.max(1)
    }
}

/// Build a client for `config`, installing a previously stored token.
pub fn connect(config: &SessionConfig) -> Result<AcsClient, CoreError> {
    let client = AcsClient::new(config.url.clone(), &config.transport())?;
    if let Some(token) = &config.token {
        client.set_token(token.clone());
    }
    Ok(client)
}

/// Reuse the stored token if the cluster still accepts it.
///
/// The token is checked by reading the configured account. `Ok(None)` means
/// there is no token or it was refused, and the caller should log in. An
/// unreachable master is an error like any other request.
pub async fn resume(config: &SessionConfig) -> Result<Option<AcsClient>, CoreError> {
    let client = connect(config)?;
    if !client.has_token() {
        return Ok(None);
    }
    match client.user(&config.username).await {
        Ok(_) => {
            info!(url = %config.url, uid = %config.username, "reusing stored token");
            Ok(Some(client))
        }
        Err(e) if e.is_auth_expired() || matches!(e.status(), Some(403 | 404)) => {
            info!(error = %e, "stored token not accepted");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Build a client for `config` and exchange the credentials for a token.
///
/// Any failure is fatal for the run: nothing else can be done without a
/// token. On success the token is installed on the returned client.
pub async fn login(config: &SessionConfig) -> Result<(AcsClient, SecretString), CoreError> {
    let client = AcsClient::new(config.url.clone(), &config.transport())?;
    info!(url = %config.url, uid = %config.username, "logging in");
    let token = client
        .login(&config.username, &config.password)
        .await
        .map_err(|e| CoreError::AuthenticationFailed {
            message: match e {
                dcos_iam_api::Error::Authentication { message } => message,
                other => other.to_string(),
            },
        })?;
    Ok((client, token))
}
