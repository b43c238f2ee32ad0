//! Configuration for the dcos-iam tool.
//!
//! A single JSON file (by default `./.config.json`) with upper-case keys,
//! layered under `DCOS_IAM_*` environment variables, and translated to
//! `dcos_iam_core::SessionConfig`. Keys are matched case-insensitively and
//! the older `USERNAME` / `PASSWORD` spellings are still understood.
//!
//! Writes are always read-modify-write of the whole file, so changing one
//! field (typically the token) never drops the others.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use thiserror::Error;

use dcos_iam_api::{TlsMode, normalize_base_url};
use dcos_iam_core::{PublishDefaults, SessionConfig, SyncOptions};

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".config.json";

/// Prefix for environment overrides (`DCOS_IAM_DCOS_IP`, ...).
/// `DCOS_IAM_CONFIG` names the file itself and is not a config key.
pub const ENV_PREFIX: &str = "DCOS_IAM_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {} not found", path.display())]
    NotFound { path: PathBuf },

    #[error("config file {} is not valid JSON: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config struct ───────────────────────────────────────────────────

/// Program configuration as stored on disk.
///
/// Field names are the lower-case form of the file's keys.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Master address: bare host, `host:port`, or a full URL.
    pub dcos_ip: String,
    pub dcos_username: String,
    pub dcos_password: String,
    /// Password given to restored regular users.
    pub default_user_password: String,
    /// Secret given to restored service accounts without a public key.
    pub default_user_secret: String,
    /// Base for relative `data_dir` / `backup_dir`.
    pub working_dir: PathBuf,
    pub data_dir: PathBuf,
    pub backup_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub insecure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
    pub timeout_secs: u64,
    pub concurrency: usize,
    /// Keys this version does not know, kept so a rewrite does not lose them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dcos_ip: "127.0.0.1".into(),
            dcos_username: "bootstrapuser".into(),
            dcos_password: "deleteme".into(),
            default_user_password: "deleteme".into(),
            default_user_secret: "secret".into(),
            working_dir: PathBuf::from("."),
            data_dir: PathBuf::from("./data"),
            backup_dir: PathBuf::from("./backup"),
            token: None,
            insecure: false,
            ca_cert: None,
            timeout_secs: 30,
            concurrency: 1,
            extra: Map::new(),
        }
    }
}

impl Config {
    /// A new snapshot carrying `token`; `self` is left unchanged.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    /// `dir` resolved against `working_dir` when relative.
    pub fn resolve(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.working_dir.join(dir)
        }
    }

    pub fn resolved_data_dir(&self) -> PathBuf {
        self.resolve(&self.data_dir)
    }

    pub fn resolved_backup_dir(&self) -> PathBuf {
        self.resolve(&self.backup_dir)
    }
}

// ── Key normalisation ───────────────────────────────────────────────

/// Lower-case every key and map legacy spellings to current ones.
fn normalize_keys(doc: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    let mut legacy = Vec::new();
    for (key, value) in doc {
        let key = key.to_ascii_lowercase();
        match key.as_str() {
            "username" => legacy.push(("dcos_username", value)),
            "password" => legacy.push(("dcos_password", value)),
            _ => {
                out.insert(key, value);
            }
        }
    }
    for (key, value) in legacy {
        out.entry(key).or_insert(value);
    }
    out
}

/// Upper-case every key for the on-disk form.
fn file_form(config: &Config) -> Result<Map<String, Value>, ConfigError> {
    let Value::Object(map) = serde_json::to_value(config)? else {
        return Err(ConfigError::Validation {
            field: "config".into(),
            reason: "did not serialize to an object".into(),
        });
    };
    Ok(map
        .into_iter()
        .map(|(k, v)| (k.to_ascii_uppercase(), v))
        .collect())
}

fn read_document(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };
    let doc: Map<String, Value> =
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(normalize_keys(doc))
}

// ── Config loading ──────────────────────────────────────────────────

/// Load defaults → file → `DCOS_IAM_*` environment.
///
/// A missing file is [`ConfigError::NotFound`] so the caller can run the
/// first-time setup instead of silently using defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let doc = read_document(path)?;

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Serialized::defaults(doc))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Defaults → file only, for read-modify-write. Environment overrides are
/// deliberately not written back to disk.
fn load_file_layer(path: &Path) -> Result<Config, ConfigError> {
    let doc = match read_document(path) {
        Ok(doc) => doc,
        Err(ConfigError::NotFound { .. }) => Map::new(),
        Err(e) => return Err(e),
    };
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Serialized::defaults(doc))
        .extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Write the full config to `path` (temp file + rename).
pub fn save_config(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let json = serde_json::to_string_pretty(&file_form(cfg)?)?;
    let mut tmp = NamedTempFile::new_in(&parent)?;
    tmp.write_all(json.as_bytes())?;
    tmp.persist(path).map_err(|e| ConfigError::Io(e.error))?;
    Ok(())
}

/// Load the file (or defaults), apply `f`, write the merged result back.
///
/// Returns the config as written.
pub fn update_config(path: &Path, f: impl FnOnce(&mut Config)) -> Result<Config, ConfigError> {
    let mut cfg = load_file_layer(path)?;
    f(&mut cfg);
    save_config(path, &cfg)?;
    Ok(cfg)
}

// ── Translation to core ─────────────────────────────────────────────

/// Build the core's `SessionConfig` from a loaded config.
pub fn to_session_config(cfg: &Config) -> Result<SessionConfig, ConfigError> {
    let url = normalize_base_url(&cfg.dcos_ip).map_err(|e| ConfigError::Validation {
        field: "DCOS_IP".into(),
        reason: e.to_string(),
    })?;

    if cfg.dcos_username.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "DCOS_USERNAME".into(),
            reason: "must not be empty".into(),
        });
    }

    let tls = if cfg.insecure {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = cfg.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    Ok(SessionConfig {
        url,
        username: cfg.dcos_username.clone(),
        password: SecretString::from(cfg.dcos_password.clone()),
        token: cfg.token.clone().map(SecretString::from),
        tls,
        timeout: Duration::from_secs(cfg.timeout_secs),
        data_dir: cfg.resolved_data_dir(),
        backup_dir: cfg.resolved_backup_dir(),
        defaults: PublishDefaults {
            user_password: SecretString::from(cfg.default_user_password.clone()),
            user_secret: SecretString::from(cfg.default_user_secret.clone()),
        },
        sync: SyncOptions {
            concurrency: cfg.concurrency.max(1),
        },
    })
}
