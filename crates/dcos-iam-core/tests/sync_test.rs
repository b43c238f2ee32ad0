#![allow(clippy::unwrap_used)]
// End-to-end fetch/publish tests against a wiremock cluster.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dcos_iam_api::AcsClient;
use dcos_iam_core::model::List;
use dcos_iam_core::{
    AclEntry, BackupStore, BufferFile, Direction, OpState, OperationStatus, Orchestrator, Outcome,
    PublishDefaults, Resource, SyncOptions, UserEntry,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup_with(concurrency: usize) -> (MockServer, Orchestrator, TempDir) {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    let client = AcsClient::with_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
    client.set_token(SecretString::from("tkn".to_owned()));
    let orch = Orchestrator::new(
        client,
        dcos_iam_core::BufferStore::new(tmp.path().join("data")),
        SyncOptions { concurrency },
        PublishDefaults {
            user_password: SecretString::from("changeme".to_owned()),
            user_secret: SecretString::from("s3cret".to_owned()),
        },
    );
    (server, orch, tmp)
}

async fn setup() -> (MockServer, Orchestrator, TempDir) {
    setup_with(1).await
}

async fn mock_get(server: &MockServer, p: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(p))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mock_status(server: &MockServer, verb: &str, p: &str, status: u16) {
    Mock::given(method(verb))
        .and(path(p))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// `(METHOD, path)` of every request the server saw, in arrival order.
async fn requests(server: &MockServer) -> Vec<(String, String)> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| (r.method.to_string(), r.url.path().to_owned()))
        .collect()
}

const USERS_BODY: &str = r#"{"array": [
  {"uid": "alice", "url": "/acs/api/v1/users/alice", "description": "Alice", "is_remote": false, "is_service": false},
  {"uid": "bob", "url": "/acs/api/v1/users/bob", "description": "Bob", "is_remote": false, "is_service": false}
]}"#;

// ── Fetch ───────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_users_assembles_memberships() {
    let (server, mut orch, _tmp) = setup().await;

    Mock::given(method("GET"))
        .and(path("/acs/api/v1/users"))
        .and(header("Authorization", "token=tkn"))
        .respond_with(ResponseTemplate::new(200).set_body_string(USERS_BODY))
        .mount(&server)
        .await;
    mock_get(
        &server,
        "/acs/api/v1/users/alice/groups",
        json!({"array": [{
            "membershipurl": "/acs/api/v1/groups/ops/users/alice",
            "group": {"gid": "ops", "url": "/acs/api/v1/groups/ops", "description": "Ops"}
        }]}),
    )
    .await;
    mock_get(&server, "/acs/api/v1/users/bob/groups", json!({"array": []})).await;
    mock_get(
        &server,
        "/acs/api/v1/users/alice/permissions",
        json!({"direct": [{"rid": "dcos:superuser", "actions": [{"name": "full"}]}], "groups": []}),
    )
    .await;
    mock_get(
        &server,
        "/acs/api/v1/users/bob/permissions",
        json!({"direct": [], "groups": []}),
    )
    .await;

    let summary = orch.get(Resource::Users).await;
    assert_eq!(summary.status(), OperationStatus::Success);
    assert_eq!(orch.state().get(Resource::Users, Direction::Get), OpState::Done);

    let buffer = orch.buffer();
    assert_eq!(buffer.read_raw(BufferFile::Users).unwrap(), USERS_BODY);

    let doc: List<UserEntry> = buffer.read_doc(BufferFile::UsersGroups).unwrap();
    assert_eq!(doc.array.len(), 2);
    assert_eq!(doc.array[0].uid, "alice");
    assert_eq!(doc.array[0].groups.len(), 1);
    assert_eq!(doc.array[0].groups[0].group.gid, "ops");
    assert_eq!(doc.array[0].permissions[0].rid, "dcos:superuser");
    assert_eq!(doc.array[1].uid, "bob");
    assert!(doc.array[1].groups.is_empty());

    // one permissions call per user, not per membership
    let perm_calls = requests(&server)
        .await
        .into_iter()
        .filter(|(_, p)| p.ends_with("/permissions"))
        .count();
    assert_eq!(perm_calls, 2);
}

#[tokio::test]
async fn fetch_acls_escapes_rids_and_collects_action_values() {
    let (server, mut orch, _tmp) = setup().await;

    mock_get(
        &server,
        "/acs/api/v1/acls",
        json!({"array": [{"rid": "foo/bar", "url": "/acs/api/v1/acls/foo%252Fbar", "description": "Foo"}]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/acs/api/v1/acls/foo%252Fbar/permissions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"uid": "alice", "url": "/acs/api/v1/users/alice", "actions": [{"name": "read", "url": "x"}]}],
            "groups": [{"gid": "ops", "url": "/acs/api/v1/groups/ops", "actions": [{"name": "full", "url": "y"}]}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mock_get(
        &server,
        "/acs/api/v1/acls/foo%252Fbar/users/alice/read",
        json!({"allowed": true}),
    )
    .await;
    mock_get(
        &server,
        "/acs/api/v1/acls/foo%252Fbar/groups/ops/full",
        json!({"allowed": true}),
    )
    .await;

    let summary = orch.get(Resource::Acls).await;
    assert_eq!(summary.status(), OperationStatus::Success);

    let doc: List<AclEntry> = orch.buffer().read_doc(BufferFile::AclsPermissions).unwrap();
    let acl = &doc.array[0];
    // stored unescaped
    assert_eq!(acl.rid, "foo/bar");
    assert_eq!(acl.users[0].actions[0].value, Some(json!({"allowed": true})));
    assert_eq!(acl.groups[0].actions[0].value, Some(json!({"allowed": true})));
}

#[tokio::test]
async fn failed_primary_keeps_previous_buffer() {
    let (server, mut orch, _tmp) = setup().await;
    orch.buffer()
        .write_raw(BufferFile::Groups, r#"{"array": []}"#)
        .unwrap();

    mock_status(&server, "GET", "/acs/api/v1/groups", 500).await;

    let summary = orch.get(Resource::Groups).await;
    assert_eq!(summary.status(), OperationStatus::Failure);
    assert_eq!(orch.state().get(Resource::Groups, Direction::Get), OpState::Error);
    assert_eq!(
        orch.buffer().read_raw(BufferFile::Groups).unwrap(),
        r#"{"array": []}"#
    );
    assert!(!orch.buffer().exists(BufferFile::GroupsUsers));
}

#[tokio::test]
async fn element_failure_is_isolated() {
    let (server, mut orch, _tmp) = setup().await;

    Mock::given(method("GET"))
        .and(path("/acs/api/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string(USERS_BODY))
        .mount(&server)
        .await;
    mock_status(&server, "GET", "/acs/api/v1/users/alice/groups", 500).await;
    mock_get(&server, "/acs/api/v1/users/alice/permissions", json!({"direct": []})).await;
    mock_get(&server, "/acs/api/v1/users/bob/groups", json!({"array": []})).await;
    mock_get(&server, "/acs/api/v1/users/bob/permissions", json!({"direct": []})).await;

    let summary = orch.get(Resource::Users).await;
    assert_eq!(summary.status(), OperationStatus::Partial);
    assert_eq!(orch.state().get(Resource::Users, Direction::Get), OpState::Partial);

    let relations = &summary.reports[1];
    assert_eq!(relations.failed(), 1);
    assert_eq!(relations.failures().next().unwrap().target, "alice");

    // the partial entry is still written
    let doc: List<UserEntry> = orch.buffer().read_doc(BufferFile::UsersGroups).unwrap();
    assert_eq!(doc.array.len(), 2);
}

#[tokio::test]
async fn concurrent_fetch_keeps_file_order() {
    let (server, mut orch, _tmp) = setup_with(4).await;

    let users: Vec<Value> = (0..6).map(|i| json!({"uid": format!("u{i}")})).collect();
    mock_get(&server, "/acs/api/v1/users", json!({"array": users})).await;
    for i in 0..6 {
        mock_get(
            &server,
            &format!("/acs/api/v1/users/u{i}/groups"),
            json!({"array": []}),
        )
        .await;
        mock_get(
            &server,
            &format!("/acs/api/v1/users/u{i}/permissions"),
            json!({"direct": []}),
        )
        .await;
    }

    orch.get(Resource::Users).await;

    let doc: List<UserEntry> = orch.buffer().read_doc(BufferFile::UsersGroups).unwrap();
    let uids: Vec<_> = doc.array.iter().map(|u| u.uid.as_str()).collect();
    assert_eq!(uids, vec!["u0", "u1", "u2", "u3", "u4", "u5"]);
}

#[tokio::test]
async fn missing_ldap_directory_is_skipped() {
    let (server, mut orch, _tmp) = setup().await;
    mock_status(&server, "GET", "/acs/api/v1/ldap/config", 404).await;

    let summary = orch.get(Resource::Ldap).await;
    assert_eq!(summary.status(), OperationStatus::Success);
    assert_eq!(summary.reports[0].skipped(), 1);
    assert!(!orch.buffer().exists(BufferFile::Ldap));
}

#[tokio::test]
async fn agents_are_split_by_state() {
    let (server, mut orch, _tmp) = setup().await;
    mock_get(
        &server,
        "/mesos/slaves",
        json!({"slaves": [
            {"id": "a1", "hostname": "10.0.0.1", "active": true},
            {"id": "a2", "hostname": "10.0.0.2", "active": false}
        ]}),
    )
    .await;

    let summary = orch.get(Resource::Agents).await;
    let agents = summary.agents.unwrap();
    assert_eq!(agents.active, vec!["10.0.0.1"]);
    assert_eq!(agents.inactive, vec!["10.0.0.2"]);
    assert!(orch.buffer().exists(BufferFile::Agents));
}

// ── Publish ─────────────────────────────────────────────────────────

#[tokio::test]
async fn publish_groups_with_empty_buffer_makes_no_calls() {
    let (server, mut orch, _tmp) = setup().await;

    let summary = orch.put(Resource::Groups).await;

    assert_eq!(summary.status(), OperationStatus::Failure);
    let reason = &summary.reports[0].outcomes[0].outcome;
    assert!(matches!(reason, Outcome::Failed(r) if r.contains("groups.json")));
    assert!(requests(&server).await.is_empty());
}

#[tokio::test]
async fn publish_all_creates_before_binding() {
    let (server, mut orch, _tmp) = setup().await;
    let buffer = orch.buffer();
    buffer.write_raw(BufferFile::Users, USERS_BODY).unwrap();
    buffer
        .write_raw(
            BufferFile::UsersGroups,
            r#"{"array": [
                {"uid": "alice", "groups": [{"membershipurl": "", "group": {"gid": "ops"}}], "permissions": []},
                {"uid": "bob", "groups": [], "permissions": []}
            ]}"#,
        )
        .unwrap();
    buffer
        .write_raw(BufferFile::Groups, r#"{"array": [{"gid": "ops", "description": "Ops"}]}"#)
        .unwrap();

    Mock::given(method("PUT"))
        .and(path("/acs/api/v1/users/alice"))
        .and(body_json(json!({"description": "Alice", "password": "changeme"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    mock_status(&server, "PUT", "/acs/api/v1/users/bob", 201).await;
    mock_status(&server, "PUT", "/acs/api/v1/groups/ops", 201).await;
    mock_status(&server, "PUT", "/acs/api/v1/groups/ops/users/alice", 204).await;

    let summary = orch.publish_all().await;

    let seen = requests(&server).await;
    let create = seen
        .iter()
        .position(|r| r == &("PUT".to_owned(), "/acs/api/v1/users/alice".to_owned()))
        .unwrap();
    let group = seen
        .iter()
        .position(|r| r == &("PUT".to_owned(), "/acs/api/v1/groups/ops".to_owned()))
        .unwrap();
    let bind = seen
        .iter()
        .position(|r| r == &("PUT".to_owned(), "/acs/api/v1/groups/ops/users/alice".to_owned()))
        .unwrap();
    assert!(create < bind);
    assert!(group < bind);

    // users and groups went through; ACLs, service groups and LDAP had no buffer
    assert_eq!(orch.state().get(Resource::Users, Direction::Put), OpState::Done);
    assert_eq!(orch.state().get(Resource::Groups, Direction::Put), OpState::Partial);
    assert_eq!(orch.state().get(Resource::Acls, Direction::Put), OpState::Error);
    assert_eq!(summary.status(), OperationStatus::Partial);
}

#[tokio::test]
async fn republish_is_idempotent() {
    let (server, mut orch, _tmp) = setup().await;
    let buffer = orch.buffer();
    buffer
        .write_raw(BufferFile::Groups, r#"{"array": [{"gid": "ops", "description": "Ops"}]}"#)
        .unwrap();
    buffer
        .write_raw(
            BufferFile::GroupsUsers,
            r#"{"array": [{"gid": "ops", "users": [{"membershipurl": "", "user": {"uid": "alice"}}], "permissions": []}]}"#,
        )
        .unwrap();

    mock_status(&server, "PUT", "/acs/api/v1/groups/ops", 409).await;
    Mock::given(method("PATCH"))
        .and(path("/acs/api/v1/groups/ops"))
        .and(body_json(json!({"description": "Ops"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    mock_status(&server, "PUT", "/acs/api/v1/groups/ops/users/alice", 409).await;

    let summary = orch.put(Resource::Groups).await;

    assert_eq!(summary.status(), OperationStatus::Success);
    assert_eq!(summary.reports[0].succeeded(), 1);
    assert_eq!(summary.reports[1].skipped(), 1);
}

#[tokio::test]
async fn acl_grants_use_escaped_paths() {
    let (server, mut orch, _tmp) = setup().await;
    let buffer = orch.buffer();
    buffer
        .write_raw(BufferFile::Acls, r#"{"array": [{"rid": "a/b", "description": "AB"}]}"#)
        .unwrap();
    buffer
        .write_raw(
            BufferFile::AclsPermissions,
            r#"{"array": [{"rid": "a/b",
                "users": [{"uid": "alice", "actions": [{"name": "read", "value": {"allowed": true}}]}],
                "groups": [{"gid": "ops", "actions": [{"name": "full"}]}]}]}"#,
        )
        .unwrap();

    mock_status(&server, "PUT", "/acs/api/v1/acls/a%252Fb", 201).await;
    mock_status(&server, "PUT", "/acs/api/v1/acls/a%252Fb/users/alice/read", 204).await;
    mock_status(&server, "PUT", "/acs/api/v1/acls/a%252Fb/groups/ops/full", 204).await;

    let summary = orch.put(Resource::Acls).await;
    assert_eq!(summary.status(), OperationStatus::Success);
    assert_eq!(summary.reports[1].succeeded(), 2);
}

#[tokio::test]
async fn service_groups_post_sanitized_children_only() {
    let (server, mut orch, _tmp) = setup().await;
    orch.buffer()
        .write_raw(
            BufferFile::ServiceGroups,
            &json!({
                "id": "/",
                "version": "2024-01-01T00:00:00.000Z",
                "apps": [],
                "groups": [
                    {"id": "/prod", "version": "v", "apps": [{"id": "/prod/web"}],
                     "groups": [{"id": "/prod/db", "version": "v", "apps": [{"id": "/prod/db/pg"}], "groups": []}]},
                    {"id": "/dev", "version": "v", "apps": [], "groups": []}
                ]
            })
            .to_string(),
        )
        .unwrap();

    mock_status(&server, "POST", "/marathon/v2/groups", 201).await;

    let summary = orch.put(Resource::ServiceGroups).await;
    assert_eq!(summary.status(), OperationStatus::Success);

    let posted: Vec<Value> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect();
    let ids: Vec<_> = posted.iter().map(|b| b["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["/prod", "/dev"]);

    fn assert_clean(node: &Value) {
        assert_eq!(node["apps"], json!([]));
        assert!(node.get("version").is_none());
        for child in node["groups"].as_array().unwrap() {
            assert_clean(child);
        }
    }
    posted.iter().for_each(assert_clean);
}

#[tokio::test]
async fn service_accounts_get_key_or_default_secret() {
    let (server, mut orch, _tmp) = setup().await;
    orch.buffer()
        .write_raw(
            BufferFile::Users,
            r#"{"array": [
                {"uid": "svc-key", "description": "K", "is_service": true, "public_key": "PEM"},
                {"uid": "svc-plain", "description": "P", "is_service": true}
            ]}"#,
        )
        .unwrap();

    Mock::given(method("PUT"))
        .and(path("/acs/api/v1/users/svc-key"))
        .and(body_json(json!({"description": "K", "public_key": "PEM"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/acs/api/v1/users/svc-plain"))
        .and(body_json(json!({"description": "P", "secret": "s3cret"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let summary = orch.put(Resource::Users).await;
    // creation went through; the memberships file is missing
    assert_eq!(summary.reports[0].status(), OperationStatus::Success);
    assert!(summary.reports[1].outcomes[0].outcome.is_failure());
}

#[tokio::test]
async fn ldap_config_is_replayed_unmodified() {
    let (server, mut orch, _tmp) = setup().await;
    let config = json!({"host": "ldap.corp", "port": 636, "dntemplate": "uid=%(username)s,dc=corp"});
    orch.buffer()
        .write_raw(BufferFile::Ldap, &config.to_string())
        .unwrap();

    Mock::given(method("PUT"))
        .and(path("/acs/api/v1/ldap/config"))
        .and(body_json(config))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let summary = orch.put(Resource::Ldap).await;
    assert_eq!(summary.status(), OperationStatus::Success);
}

// ── Backups ─────────────────────────────────────────────────────────

#[tokio::test]
async fn backup_round_trip_feeds_publish() {
    let (server, mut orch, tmp) = setup().await;
    let backups = BackupStore::new(tmp.path().join("backup"));

    orch.buffer()
        .write_raw(BufferFile::Groups, r#"{"array": [{"gid": "ops", "description": "Ops"}]}"#)
        .unwrap();
    backups.save("snap", orch.buffer()).unwrap();
    orch.buffer().reset().unwrap();
    backups.load("snap", orch.buffer()).unwrap();

    mock_status(&server, "PUT", "/acs/api/v1/groups/ops", 201).await;

    let summary = orch.put(Resource::Groups).await;
    assert_eq!(summary.reports[0].status(), OperationStatus::Success);
}
