// ── Relationship documents ──
//
// Shapes the fetchers assemble from several dependent calls and write to
// the `*_groups`, `*_users` and `*_permissions` buffer files. Primary
// collections are stored exactly as the cluster sent them and parsed with
// the wire models from `dcos_iam_api::models`.

use dcos_iam_api::models::{
    AclGroupGrant, AclUserGrant, GroupMembership, Permission, UserMembership,
};
use serde::{Deserialize, Serialize};

pub use dcos_iam_api::models::List;

/// A user with its memberships and direct permissions (`users_groups.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEntry {
    pub uid: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_remote: bool,
    #[serde(default)]
    pub is_service: bool,
    #[serde(default)]
    pub groups: Vec<GroupMembership>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// A group with its members and permissions (`groups_users.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub gid: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub users: Vec<UserMembership>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// An ACL with every principal's actions and their values
/// (`acls_permissions.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AclEntry {
    pub rid: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub users: Vec<AclUserGrant>,
    #[serde(default)]
    pub groups: Vec<AclGroupGrant>,
}

/// Agent hostnames split by state, for display after a fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgentSummary {
    pub active: Vec<String>,
    pub inactive: Vec<String>,
}
