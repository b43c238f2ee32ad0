//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use dcos_iam_config::ConfigError;
use dcos_iam_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    /// 128 + SIGINT, as a shell reports an interrupted process.
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to cluster at {url}")]
    #[diagnostic(
        code(dcos_iam::connection_failed),
        help(
            "Check DCOS_IP in the config file and that the master is reachable.\n\
             For self-signed certificates try --insecure."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(dcos_iam::timeout),
        help("Increase the timeout with --timeout or TIMEOUT_SECS.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Login failed: {message}")]
    #[diagnostic(
        code(dcos_iam::auth_failed),
        help(
            "Verify DCOS_USERNAME and DCOS_PASSWORD in {config}.\n\
             Run: dcos-iam config init"
        )
    )]
    AuthFailed { message: String, config: String },

    // ── Buffer / backups ─────────────────────────────────────────────
    #[error("{what} not found")]
    #[diagnostic(code(dcos_iam::not_found), help("{hint}"))]
    NotFound { what: String, hint: String },

    #[error("Buffer file {file} is unreadable: {reason}")]
    #[diagnostic(
        code(dcos_iam::buffer_corrupt),
        help("Fetch the resource again or load a backup.")
    )]
    BufferCorrupt { file: String, reason: String },

    // ── Operations ───────────────────────────────────────────────────
    #[error("{operation} did not complete: {failed} failed, {cancelled} cancelled")]
    #[diagnostic(
        code(dcos_iam::partial),
        help("Re-run with -v to see each failure in the log.")
    )]
    OperationFailed {
        operation: String,
        failed: usize,
        cancelled: usize,
    },

    #[error("API error: {message}")]
    #[diagnostic(code(dcos_iam::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(dcos_iam::validation))]
    Validation { field: String, reason: String },

    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(dcos_iam::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found")]
    #[diagnostic(
        code(dcos_iam::no_config),
        help(
            "Create one with: dcos-iam config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(dcos_iam::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    #[diagnostic(code(dcos_iam::serialize))]
    Serialize(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::NoConfig { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => Self::AuthFailed {
                message,
                config: dcos_iam_config::DEFAULT_CONFIG_FILE.into(),
            },

            CoreError::Timeout => Self::Timeout,

            CoreError::BufferNotFound { file } => Self::NotFound {
                what: format!("Buffer file {file}"),
                hint: "Fetch it first (dcos-iam get ...) or load a backup.".into(),
            },

            CoreError::BufferCorrupt { file, reason } => Self::BufferCorrupt { file, reason },

            CoreError::BackupNotFound { name } => Self::NotFound {
                what: format!("Backup '{name}'"),
                hint: "Run: dcos-iam backups list".into(),
            },

            CoreError::InvalidBackupName { name, reason } => Self::Validation {
                field: format!("backup name {name:?}"),
                reason,
            },

            CoreError::Api { message, status: _ } => Self::ApiError { message },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Io { source, .. } => Self::Io(source),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => Self::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}
