// ACLs, their grants, and the value of every granted action.
//
// This is the expensive walk: one permissions call per ACL plus one call
// per (principal, action) pair.

use dcos_iam_api::Principal;
use dcos_iam_api::models::{Acl, Action};
use tracing::{debug, info, warn};

use super::{Fetcher, element_outcome, reports};
use crate::model::{AclEntry, BufferFile, List, OperationReport, Outcome, Resource};
use crate::pass::run_ordered;

impl Fetcher<'_> {
    /// `GET /acls`, then per ACL its permissions and action values.
    ///
    /// Writes `acls.json` (raw) and `acls_permissions.json`.
    pub async fn fetch_acls(&self) -> Vec<OperationReport> {
        let (mut primary, mut relations) = reports(Resource::Acls);

        let Some(acls) = self
            .primary::<List<Acl>, _>(Resource::Acls, &mut primary, self.client.acls_raw())
            .await
        else {
            return vec![primary];
        };
        info!(count = acls.array.len(), "fetched acls");

        let rids: Vec<String> = acls.array.iter().map(|a| a.rid.clone()).collect();
        let results = run_ordered(acls.array, self.options.width(), self.cancel, |acl| {
            self.acl_entry(acl)
        })
        .await;

        let mut doc = List { array: Vec::new() };
        for (rid, result) in rids.into_iter().zip(results) {
            match result {
                Some((entry, outcome)) => {
                    doc.array.push(entry);
                    relations.push(rid, outcome);
                }
                None => relations.push(rid, Outcome::Cancelled),
            }
        }

        self.persist_doc(BufferFile::AclsPermissions, &doc, &mut relations);
        vec![primary, relations]
    }

    async fn acl_entry(&self, acl: Acl) -> (AclEntry, Outcome) {
        let mut entry = AclEntry {
            rid: acl.rid,
            url: acl.url,
            description: acl.description,
            users: Vec::new(),
            groups: Vec::new(),
        };

        let grants = match self.client.acl_permissions(&entry.rid).await {
            Ok(grants) => grants,
            Err(e) => {
                warn!(operation = "GET", resource = "acls", target = %entry.rid, error = %e, "permissions unavailable");
                return (entry, Outcome::Failed(format!("permissions: {e}")));
            }
        };

        let mut errors = Vec::new();
        entry.users = grants.users;
        entry.groups = grants.groups;

        for user in &mut entry.users {
            self.fill_action_values(
                &entry.rid,
                Principal::User(&user.uid),
                &mut user.actions,
                &mut errors,
            )
            .await;
        }
        for group in &mut entry.groups {
            self.fill_action_values(
                &entry.rid,
                Principal::Group(&group.gid),
                &mut group.actions,
                &mut errors,
            )
            .await;
        }

        (entry, element_outcome(&errors))
    }

    async fn fill_action_values(
        &self,
        rid: &str,
        principal: Principal<'_>,
        actions: &mut [Action],
        errors: &mut Vec<String>,
    ) {
        for (index, action) in actions.iter_mut().enumerate() {
            match self.client.acl_action(rid, principal, &action.name).await {
                Ok(value) => {
                    debug!(rid, ?principal, action = %action.name, index, "action value fetched");
                    action.value = Some(value);
                }
                Err(e) => {
                    warn!(
                        operation = "GET",
                        resource = "acls",
                        target = rid,
                        principal = ?principal,
                        action = %action.name,
                        index,
                        error = %e,
                        "action value unavailable"
                    );
                    errors.push(format!("{principal:?}/{}: {e}", action.name));
                }
            }
        }
    }
}
