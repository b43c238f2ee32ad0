// ── Core error types ──
//
// User-facing errors from dcos-iam-core. Per-element HTTP failures never
// surface here; they become `Outcome::Failed` entries in a report. What
// remains are whole-operation failures: login, buffer files, backups.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to cluster at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cluster request timed out")]
    Timeout,

    // ── Buffer errors ────────────────────────────────────────────────
    #[error("Buffer file {file} not found -- fetch or load a backup first")]
    BufferNotFound { file: String },

    #[error("Buffer file {file} is not valid JSON: {reason}")]
    BufferCorrupt { file: String, reason: String },

    // ── Backup errors ────────────────────────────────────────────────
    #[error("Backup not found: {name}")]
    BackupNotFound { name: String },

    #[error("Invalid backup name {name:?}: {reason}")]
    InvalidBackupName { name: String, reason: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if the cluster answered).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── I/O ──────────────────────────────────────────────────────────
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<dcos_iam_api::Error> for CoreError {
    fn from(err: dcos_iam_api::Error) -> Self {
        if err.is_timeout() {
            return CoreError::Timeout;
        }
        match err {
            dcos_iam_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            dcos_iam_api::Error::TokenExpired => CoreError::AuthenticationFailed {
                message: "Token rejected -- re-authentication required".into(),
            },
            dcos_iam_api::Error::Transport(ref e) => {
                if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            dcos_iam_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            e @ dcos_iam_api::Error::InvalidPath { .. } => CoreError::Api {
                message: e.to_string(),
                status: None,
            },
            dcos_iam_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            dcos_iam_api::Error::Status { status, body } => CoreError::Api {
                message: format!("HTTP {status}: {body}"),
                status: Some(status),
            },
            dcos_iam_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("Deserialization error: {message}"),
                status: None,
            },
        }
    }
}
