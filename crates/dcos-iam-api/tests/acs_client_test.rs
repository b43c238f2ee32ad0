#![allow(clippy::unwrap_used)]
// Integration tests for `AcsClient` using wiremock.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dcos_iam_api::models::ServiceGroup;
use dcos_iam_api::{AcsClient, Error, Principal, UserCredential};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, AcsClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = AcsClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_owned())
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success_installs_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/acs/api/v1/auth/login"))
        .and(body_json(json!({"uid": "bootstrapuser", "password": "deleteme"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc.def"})))
        .expect(1)
        .mount(&server)
        .await;

    let token = client
        .login("bootstrapuser", &secret("deleteme"))
        .await
        .unwrap();

    assert_eq!(token.expose_secret(), "abc.def");
    assert!(client.has_token());
}

#[tokio::test]
async fn test_login_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/acs/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "title": "Unauthorized",
            "code": "ERR_INVALID_CREDENTIALS"
        })))
        .mount(&server)
        .await;

    let result = client.login("bootstrapuser", &secret("wrong")).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert!(!client.has_token());
}

#[tokio::test]
async fn test_login_reply_without_token_is_an_auth_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/acs/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": null})))
        .mount(&server)
        .await;

    let result = client.login("bootstrapuser", &secret("deleteme")).await;
    assert!(matches!(result, Err(Error::Authentication { .. })));
}

#[tokio::test]
async fn test_requests_carry_token_header() {
    let (server, client) = setup().await;
    client.set_token(secret("tkn"));

    Mock::given(method("GET"))
        .and(path("/acs/api/v1/users"))
        .and(header("Authorization", "token=tkn"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"array": []}"#))
        .expect(1)
        .mount(&server)
        .await;

    let raw = client.users_raw().await.unwrap();
    assert_eq!(raw, r#"{"array": []}"#);
}

// ── Listing tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_user_groups_unwraps_array_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/acs/api/v1/users/alice/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "array": [{
                "membershipurl": "/acs/api/v1/groups/ops/users/alice",
                "group": {"gid": "ops", "url": "/acs/api/v1/groups/ops", "description": "Ops"}
            }]
        })))
        .mount(&server)
        .await;

    let groups = client.user_groups("alice").await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].group.gid, "ops");
}

#[tokio::test]
async fn test_acl_paths_escape_slashes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/acs/api/v1/acls/foo%252Fbar/permissions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"uid": "alice", "actions": [{"name": "read"}]}],
            "groups": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let perms = client.acl_permissions("foo/bar").await.unwrap();
    assert_eq!(perms.users[0].uid, "alice");
    assert_eq!(perms.users[0].actions[0].name, "read");
}

#[tokio::test]
async fn test_acl_action_value() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/acs/api/v1/acls/dcos:superuser/groups/ops/full"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"allowed": true})))
        .mount(&server)
        .await;

    let value = client
        .acl_action("dcos:superuser", Principal::Group("ops"), "full")
        .await
        .unwrap();
    assert_eq!(value, json!({"allowed": true}));
}

// ── Mutation tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_create_user_with_password() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/acs/api/v1/users/alice"))
        .and(body_json(json!({"description": "Alice", "password": "changeme"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let password = secret("changeme");
    client
        .create_user("alice", "Alice", UserCredential::Password(&password))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_grant_acl_action_to_user() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/acs/api/v1/acls/a%252Fb/users/alice/read"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client
        .grant_acl_action("a/b", Principal::User("alice"), "read")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_service_group_posts_marathon() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/marathon/v2/groups"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"deploymentId": "x"})))
        .expect(1)
        .mount(&server)
        .await;

    let group: ServiceGroup =
        serde_json::from_value(json!({"id": "/prod", "apps": [], "groups": []})).unwrap();
    client.create_service_group(&group).await.unwrap();
}

// ── Error mapping tests ─────────────────────────────────────────────

#[tokio::test]
async fn test_401_maps_to_token_expired() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/acs/api/v1/groups"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.groups_raw().await.unwrap_err();
    assert!(matches!(err, Error::TokenExpired));
    assert!(err.is_auth_expired());
}

#[tokio::test]
async fn test_404_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/acs/api/v1/ldap/config"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no directory"))
        .mount(&server)
        .await;

    let err = client.ldap_config_raw().await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_error_body_is_truncated() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/mesos/slaves"))
        .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(1000)))
        .mount(&server)
        .await;

    match client.agents_raw().await.unwrap_err() {
        Error::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body.len(), 200);
        }
        other => panic!("expected Status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_garbage_body_is_a_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/acs/api/v1/groups/ops/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client.group_users("ops").await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }));
}

#[tokio::test]
async fn test_dot_identifiers_never_reach_the_cluster() {
    let (server, client) = setup().await;

    for id in ["..", ".", "%2e%2e"] {
        let err = client.user_groups(id).await.unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }), "{id}: {err:?}");
    }
    let err = client
        .grant_acl_action("dcos:x", Principal::User(".."), "full")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPath { .. }));

    assert!(server.received_requests().await.unwrap().is_empty());
}
