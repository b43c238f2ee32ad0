//! Config subcommand handlers.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use dialoguer::Input;
use serde_json::{Map, Value};
use tracing::warn;

use dcos_iam_config::{Config, ConfigError};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

const MASK: &str = "********";

// ── Show ────────────────────────────────────────────────────────────

/// Config as stored keys, with every secret masked.
fn masked_view(config: &Config) -> Result<Map<String, Value>, CliError> {
    let masked = Config {
        dcos_password: MASK.into(),
        default_user_password: MASK.into(),
        default_user_secret: MASK.into(),
        token: config.token.as_ref().map(|_| MASK.into()),
        ..config.clone()
    };
    let Value::Object(map) = serde_json::to_value(&masked)? else {
        return Ok(Map::new());
    };
    Ok(map
        .into_iter()
        .map(|(k, v)| (k.to_ascii_uppercase(), v))
        .collect())
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn show(config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let view = masked_view(config)?;
    let out = output::render_single(
        global.output,
        &view,
        |m| {
            let width = m.keys().map(String::len).max().unwrap_or(0);
            let mut text = String::new();
            for (key, value) in m {
                let _ = writeln!(text, "{key:<width$}  {}", value_text(value));
            }
            text.trim_end().to_owned()
        },
        |m| {
            m.iter()
                .map(|(k, v)| format!("{k}={}", value_text(v)))
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Init: interactive wizard ────────────────────────────────────────

/// Ask for connection details and write a complete config file.
///
/// Existing values are offered as defaults. A stored token is dropped
/// since it belongs to the old credentials.
pub fn init(path: &Path) -> Result<Config, CliError> {
    let base = match dcos_iam_config::load_config(path) {
        Ok(cfg) => cfg,
        Err(ConfigError::NotFound { .. }) => Config::default(),
        Err(e) => {
            warn!(error = %e, "existing config unreadable, starting from defaults");
            Config::default()
        }
    };

    eprintln!("dcos-iam configuration");
    eprintln!("   Config path: {}\n", path.display());

    let dcos_ip: String = Input::new()
        .with_prompt("DC/OS master address")
        .default(base.dcos_ip.clone())
        .interact_text()
        .map_err(prompt_err)?;

    let dcos_username: String = Input::new()
        .with_prompt("Username")
        .default(base.dcos_username.clone())
        .interact_text()
        .map_err(prompt_err)?;

    let password = rpassword::prompt_password("Password (empty keeps current): ")
        .map_err(prompt_err)?;
    let dcos_password = if password.is_empty() {
        base.dcos_password.clone()
    } else {
        password
    };

    let default_user_password: String = Input::new()
        .with_prompt("Password for restored users")
        .default(base.default_user_password.clone())
        .interact_text()
        .map_err(prompt_err)?;

    let default_user_secret: String = Input::new()
        .with_prompt("Secret for restored service accounts")
        .default(base.default_user_secret.clone())
        .interact_text()
        .map_err(prompt_err)?;

    let working_dir: String = Input::new()
        .with_prompt("Working directory")
        .default(base.working_dir.display().to_string())
        .interact_text()
        .map_err(prompt_err)?;

    let config = Config {
        dcos_ip,
        dcos_username,
        dcos_password,
        default_user_password,
        default_user_secret,
        working_dir: PathBuf::from(working_dir),
        token: None,
        ..base
    };
    dcos_iam_config::to_session_config(&config)?;
    dcos_iam_config::save_config(path, &config)?;
    eprintln!("   Wrote {}", path.display());
    Ok(config)
}
