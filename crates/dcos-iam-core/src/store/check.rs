// ── Buffer check views ──
//
// Human summaries of what the buffer currently holds. Display-only: the
// rows are never fed back into a publish.

use dcos_iam_api::models::{AgentList, ServiceGroup, User};
use serde::Serialize;
use serde_json::Value;

use super::buffer::BufferStore;
use crate::error::CoreError;
use crate::model::{AclEntry, BufferFile, GroupEntry, List, Resource, UserEntry};

/// One line of a check view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckRow {
    pub id: String,
    pub description: String,
    pub detail: String,
}

/// Summary of one buffered collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub resource: Resource,
    /// The file the rows were read from.
    pub file: String,
    pub rows: Vec<CheckRow>,
}

impl BufferStore {
    /// Summarise one resource's buffer content.
    pub fn check(&self, resource: Resource) -> Result<CheckReport, CoreError> {
        match resource {
            Resource::Users => self.check_users(),
            Resource::Groups => self.check_groups(),
            Resource::Acls => self.check_acls(),
            Resource::Ldap => self.check_ldap(),
            Resource::ServiceGroups => self.check_service_groups(),
            Resource::Agents => self.check_agents(),
        }
    }

    /// Users with membership and permission counts. Falls back to the
    /// plain listing when no relationship document exists.
    pub fn check_users(&self) -> Result<CheckReport, CoreError> {
        if self.exists(BufferFile::UsersGroups) {
            let doc: List<UserEntry> = self.read_doc(BufferFile::UsersGroups)?;
            let rows = doc
                .array
                .into_iter()
                .map(|u| CheckRow {
                    detail: format!(
                        "{}groups: {}, permissions: {}",
                        if u.is_service { "service, " } else { "" },
                        u.groups.len(),
                        u.permissions.len()
                    ),
                    id: u.uid,
                    description: u.description,
                })
                .collect();
            return Ok(report(Resource::Users, BufferFile::UsersGroups, rows));
        }

        let doc: List<User> = self.read_doc(BufferFile::Users)?;
        let rows = doc
            .array
            .into_iter()
            .map(|u| CheckRow {
                detail: if u.is_service { "service".into() } else { String::new() },
                id: u.uid,
                description: u.description,
            })
            .collect();
        Ok(report(Resource::Users, BufferFile::Users, rows))
    }

    pub fn check_groups(&self) -> Result<CheckReport, CoreError> {
        if self.exists(BufferFile::GroupsUsers) {
            let doc: List<GroupEntry> = self.read_doc(BufferFile::GroupsUsers)?;
            let rows = doc
                .array
                .into_iter()
                .map(|g| CheckRow {
                    detail: format!(
                        "users: {}, permissions: {}",
                        g.users.len(),
                        g.permissions.len()
                    ),
                    id: g.gid,
                    description: g.description,
                })
                .collect();
            return Ok(report(Resource::Groups, BufferFile::GroupsUsers, rows));
        }

        let doc: List<dcos_iam_api::models::Group> = self.read_doc(BufferFile::Groups)?;
        let rows = doc
            .array
            .into_iter()
            .map(|g| CheckRow {
                id: g.gid,
                description: g.description,
                detail: String::new(),
            })
            .collect();
        Ok(report(Resource::Groups, BufferFile::Groups, rows))
    }

    pub fn check_acls(&self) -> Result<CheckReport, CoreError> {
        if self.exists(BufferFile::AclsPermissions) {
            let doc: List<AclEntry> = self.read_doc(BufferFile::AclsPermissions)?;
            let rows = doc
                .array
                .into_iter()
                .map(|a| {
                    let actions: usize = a.users.iter().map(|u| u.actions.len()).sum::<usize>()
                        + a.groups.iter().map(|g| g.actions.len()).sum::<usize>();
                    CheckRow {
                        detail: format!(
                            "users: {}, groups: {}, actions: {actions}",
                            a.users.len(),
                            a.groups.len()
                        ),
                        id: a.rid,
                        description: a.description,
                    }
                })
                .collect();
            return Ok(report(Resource::Acls, BufferFile::AclsPermissions, rows));
        }

        let doc: List<dcos_iam_api::models::Acl> = self.read_doc(BufferFile::Acls)?;
        let rows = doc
            .array
            .into_iter()
            .map(|a| CheckRow {
                id: a.rid,
                description: a.description,
                detail: String::new(),
            })
            .collect();
        Ok(report(Resource::Acls, BufferFile::Acls, rows))
    }

    /// Top-level LDAP settings, with anything password-like masked.
    pub fn check_ldap(&self) -> Result<CheckReport, CoreError> {
        let doc: Value = self.read_doc(BufferFile::Ldap)?;
        let rows = match doc {
            Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| CheckRow {
                    detail: if key.contains("password") {
                        "********".into()
                    } else {
                        scalar(&value)
                    },
                    id: key,
                    description: String::new(),
                })
                .collect(),
            other => vec![CheckRow {
                id: "config".into(),
                description: String::new(),
                detail: scalar(&other),
            }],
        };
        Ok(report(Resource::Ldap, BufferFile::Ldap, rows))
    }

    /// Every node of the service-group tree, depth first.
    pub fn check_service_groups(&self) -> Result<CheckReport, CoreError> {
        let root: ServiceGroup = self.read_doc(BufferFile::ServiceGroups)?;
        let mut rows = Vec::new();
        walk_groups(&root, 0, &mut rows);
        Ok(report(Resource::ServiceGroups, BufferFile::ServiceGroups, rows))
    }

    pub fn check_agents(&self) -> Result<CheckReport, CoreError> {
        let doc: AgentList = self.read_doc(BufferFile::Agents)?;
        let rows = doc
            .slaves
            .into_iter()
            .map(|a| CheckRow {
                id: a.hostname,
                description: a.id,
                detail: if a.active { "active" } else { "inactive" }.into(),
            })
            .collect();
        Ok(report(Resource::Agents, BufferFile::Agents, rows))
    }
}

fn report(resource: Resource, file: BufferFile, rows: Vec<CheckRow>) -> CheckReport {
    CheckReport {
        resource,
        file: file.to_string(),
        rows,
    }
}

fn walk_groups(node: &ServiceGroup, depth: usize, rows: &mut Vec<CheckRow>) {
    rows.push(CheckRow {
        id: node.id.clone(),
        description: String::new(),
        detail: format!(
            "depth: {depth}, groups: {}, apps: {}",
            node.groups.len(),
            node.apps.len()
        ),
    });
    for child in &node.groups {
        walk_groups(child, depth + 1, rows);
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(map) => format!("{{{} keys}}", map.len()),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> (tempfile::TempDir, BufferStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = BufferStore::new(tmp.path());
        (tmp, store)
    }

    #[test]
    fn users_prefer_relationship_document() {
        let (_tmp, store) = store();
        store
            .write_raw(BufferFile::Users, r#"{"array":[{"uid":"a"},{"uid":"b"}]}"#)
            .unwrap();
        let plain = store.check_users().unwrap();
        assert_eq!(plain.file, "users.json");
        assert_eq!(plain.rows.len(), 2);

        store
            .write_raw(
                BufferFile::UsersGroups,
                r#"{"array":[{"uid":"a","groups":[{"membershipurl":"","group":{"gid":"ops"}}],"permissions":[]}]}"#,
            )
            .unwrap();
        let rich = store.check_users().unwrap();
        assert_eq!(rich.file, "users_groups.json");
        assert_eq!(rich.rows[0].detail, "groups: 1, permissions: 0");
    }

    #[test]
    fn ldap_masks_passwords() {
        let (_tmp, store) = store();
        store
            .write_raw(
                BufferFile::Ldap,
                r#"{"host":"ldap.corp","port":636,"lookup-password":"hunter2"}"#,
            )
            .unwrap();
        let check = store.check_ldap().unwrap();
        let pw = check.rows.iter().find(|r| r.id == "lookup-password").unwrap();
        assert_eq!(pw.detail, "********");
        let port = check.rows.iter().find(|r| r.id == "port").unwrap();
        assert_eq!(port.detail, "636");
    }

    #[test]
    fn service_groups_walk_whole_tree() {
        let (_tmp, store) = store();
        store
            .write_raw(
                BufferFile::ServiceGroups,
                r#"{"id":"/","groups":[{"id":"/a","groups":[{"id":"/a/b"}]}]}"#,
            )
            .unwrap();
        let check = store.check_service_groups().unwrap();
        let ids: Vec<_> = check.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["/", "/a", "/a/b"]);
        assert!(check.rows[2].detail.starts_with("depth: 2"));
    }

    #[test]
    fn empty_buffer_reports_not_found() {
        let (_tmp, store) = store();
        assert!(matches!(
            store.check(Resource::Agents).unwrap_err(),
            CoreError::BufferNotFound { .. }
        ));
    }
}
