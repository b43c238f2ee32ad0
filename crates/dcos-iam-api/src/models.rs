// Wire types for the ACS, Mesos and Marathon APIs
//
// Field sets are deliberately loose: every struct keeps unknown keys in a
// flattened map so documents read from the cluster can be written back
// without losing data the tool does not interpret.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `{"array": [...]}` envelope the ACS API wraps every listing in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct List<T> {
    #[serde(default = "Vec::new")]
    pub array: Vec<T>,
}

// ── Principals ─────────────────────────────────────────────────────

/// A user or service account from `GET /acs/api/v1/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_remote: bool,
    #[serde(default)]
    pub is_service: bool,
    /// Service accounts carry their public key here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A group from `GET /acs/api/v1/groups`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub gid: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of `GET /users/{uid}/groups`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMembership {
    #[serde(default)]
    pub membershipurl: String,
    pub group: Group,
}

/// One entry of `GET /groups/{gid}/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMembership {
    #[serde(default)]
    pub membershipurl: String,
    pub user: User,
}

// ── ACLs ───────────────────────────────────────────────────────────

/// An ACL resource from `GET /acs/api/v1/acls`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acl {
    pub rid: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named action on an ACL (`create`, `read`, `full`, ...).
///
/// `value` is filled in by the fetcher from
/// `GET /acls/{rid}/{users|groups}/{id}/{action}` and is absent on the
/// wire listing itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// A permission a user or group holds on one ACL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub rid: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `GET /users/{uid}/permissions` or `GET /groups/{gid}/permissions`.
///
/// Users answer with `direct` (own grants) and `groups` (inherited, derived
/// from memberships); groups answer with `array`. Only directly held
/// grants are worth restoring.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionsEnvelope {
    #[serde(default)]
    pub array: Vec<Permission>,
    #[serde(default)]
    pub direct: Vec<Permission>,
}

impl PermissionsEnvelope {
    /// All directly held permissions, whichever key carried them.
    pub fn into_permissions(self) -> Vec<Permission> {
        let mut all = self.direct;
        all.extend(self.array);
        all
    }
}

/// A user's grants on one ACL, from `GET /acls/{rid}/permissions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AclUserGrant {
    pub uid: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A group's grants on one ACL, from `GET /acls/{rid}/permissions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AclGroupGrant {
    pub gid: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `GET /acls/{rid}/permissions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AclPermissions {
    #[serde(default)]
    pub users: Vec<AclUserGrant>,
    #[serde(default)]
    pub groups: Vec<AclGroupGrant>,
}

// ── Cluster ────────────────────────────────────────────────────────

/// A Mesos agent from `GET /mesos/slaves`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `GET /mesos/slaves`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentList {
    #[serde(default)]
    pub slaves: Vec<Agent>,
}

/// A Marathon group tree node from `GET /marathon/v2/groups`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceGroup {
    pub id: String,
    #[serde(default)]
    pub groups: Vec<ServiceGroup>,
    #[serde(default)]
    pub apps: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
