//! Environment overrides. Kept in its own binary because it mutates the
//! process environment.

use std::path::Path;

use figment::Jail;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use dcos_iam_config::{DEFAULT_CONFIG_FILE, load_config, update_config};

#[test]
fn environment_overrides_file_but_is_not_persisted() {
    Jail::expect_with(|jail| {
        jail.create_file(
            DEFAULT_CONFIG_FILE,
            r#"{"DCOS_IP": "10.0.0.5", "TIMEOUT_SECS": 10}"#,
        )?;
        jail.set_env("DCOS_IAM_DCOS_IP", "10.9.9.9");
        jail.set_env("DCOS_IAM_TIMEOUT_SECS", "45");

        let path = Path::new(DEFAULT_CONFIG_FILE);
        let cfg = load_config(path).map_err(|e| e.to_string())?;
        assert_eq!(cfg.dcos_ip, "10.9.9.9");
        assert_eq!(cfg.timeout_secs, 45);

        update_config(path, |c| c.token = Some("t".into())).map_err(|e| e.to_string())?;
        let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        let doc: Value = serde_json::from_str(&text).map_err(|e| e.to_string())?;
        assert_eq!(doc["DCOS_IP"], json!("10.0.0.5"));
        assert_eq!(doc["TIMEOUT_SECS"], json!(10));
        Ok(())
    });
}
