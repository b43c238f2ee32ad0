// ── Resource identifiers ──
//
// The collections the tool moves between a cluster and the buffer, and the
// buffer file each one lives in.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A synchronisable IAM collection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Users,
    Groups,
    Acls,
    Ldap,
    ServiceGroups,
    Agents,
}

impl Resource {
    /// Whether this collection can be pushed back to a cluster.
    ///
    /// Agents are a read-only inventory.
    pub fn is_publishable(self) -> bool {
        !matches!(self, Self::Agents)
    }

    /// Buffer file holding the primary collection.
    pub fn primary_file(self) -> BufferFile {
        match self {
            Self::Users => BufferFile::Users,
            Self::Groups => BufferFile::Groups,
            Self::Acls => BufferFile::Acls,
            Self::Ldap => BufferFile::Ldap,
            Self::ServiceGroups => BufferFile::ServiceGroups,
            Self::Agents => BufferFile::Agents,
        }
    }

    /// Human label used in logs and tables.
    pub fn label(self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Groups => "Groups",
            Self::Acls => "ACLs",
            Self::Ldap => "LDAP",
            Self::ServiceGroups => "Service Groups",
            Self::Agents => "Agents",
        }
    }
}

/// One file of the local buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum BufferFile {
    #[strum(serialize = "users.json")]
    Users,
    #[strum(serialize = "users_groups.json")]
    UsersGroups,
    #[strum(serialize = "groups.json")]
    Groups,
    #[strum(serialize = "groups_users.json")]
    GroupsUsers,
    #[strum(serialize = "acls.json")]
    Acls,
    #[strum(serialize = "acls_permissions.json")]
    AclsPermissions,
    #[strum(serialize = "ldap.json")]
    Ldap,
    #[strum(serialize = "agents.json")]
    Agents,
    #[strum(serialize = "service_groups.json")]
    ServiceGroups,
}

impl BufferFile {
    /// File name inside the buffer directory.
    pub fn file_name(self) -> &'static str {
        self.into()
    }
}

/// Which way data moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Direction {
    Get,
    Put,
}
