//! File-level behaviour of the config layer: first-run detection, legacy
//! keys and merge-on-write.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use dcos_iam_config::{
    Config, ConfigError, DEFAULT_CONFIG_FILE, load_config, save_config, to_session_config,
    update_config,
};

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(&dir.path().join(DEFAULT_CONFIG_FILE)).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }));
}

#[test]
fn garbage_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    std::fs::write(&path, "DCOS_IP=1.2.3.4").unwrap();
    assert!(matches!(
        load_config(&path).unwrap_err(),
        ConfigError::Parse { .. }
    ));
}

#[test]
fn legacy_file_loads_with_defaults_filled_in() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    std::fs::write(
        &path,
        r#"{"DCOS_IP": "10.0.0.5", "USERNAME": "admin", "PASSWORD": "hunter2"}"#,
    )
    .unwrap();

    let cfg = load_config(&path).unwrap();

    assert_eq!(cfg.dcos_ip, "10.0.0.5");
    assert_eq!(cfg.dcos_username, "admin");
    assert_eq!(cfg.dcos_password, "hunter2");
    assert_eq!(cfg.default_user_secret, "secret");
    assert_eq!(cfg.concurrency, 1);
}

#[test]
fn token_update_keeps_every_other_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    std::fs::write(
        &path,
        r#"{"DCOS_IP": "10.0.0.5", "DCOS_USERNAME": "ops", "BACKUP_DIR": "/mnt/bk", "NOTES": "keep me"}"#,
    )
    .unwrap();

    update_config(&path, |cfg| cfg.token = Some("tok-1".into())).unwrap();

    let doc = read_json(&path);
    assert_eq!(doc["TOKEN"], json!("tok-1"));
    assert_eq!(doc["DCOS_IP"], json!("10.0.0.5"));
    assert_eq!(doc["DCOS_USERNAME"], json!("ops"));
    assert_eq!(doc["BACKUP_DIR"], json!("/mnt/bk"));
    assert_eq!(doc["NOTES"], json!("keep me"));
}

#[test]
fn update_without_file_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join(DEFAULT_CONFIG_FILE);

    let written = update_config(&path, |cfg| cfg.dcos_ip = "master.mesos".into()).unwrap();

    assert_eq!(written.dcos_username, "bootstrapuser");
    assert_eq!(load_config(&path).unwrap(), written);
}

#[test]
fn save_then_load_keeps_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    let cfg = Config {
        dcos_ip: "https://leader.example".into(),
        insecure: true,
        concurrency: 4,
        ..Config::default()
    }
    .with_token("abc");

    save_config(&path, &cfg).unwrap();

    assert_eq!(load_config(&path).unwrap(), cfg);
}

#[test]
fn session_config_resolves_paths_and_url() {
    let cfg = Config {
        dcos_ip: "10.0.0.5:8080".into(),
        working_dir: "/srv/iam".into(),
        data_dir: "buffer".into(),
        concurrency: 0,
        ..Config::default()
    };

    let session = to_session_config(&cfg).unwrap();

    assert_eq!(session.url.as_str(), "http://10.0.0.5:8080/");
    assert_eq!(session.data_dir, Path::new("/srv/iam/buffer"));
    assert_eq!(session.sync.concurrency, 1);
}

#[test]
fn empty_username_is_rejected() {
    let cfg = Config {
        dcos_username: "  ".into(),
        ..Config::default()
    };
    assert!(matches!(
        to_session_config(&cfg).unwrap_err(),
        ConfigError::Validation { .. }
    ));
}
