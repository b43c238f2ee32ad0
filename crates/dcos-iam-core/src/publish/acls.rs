// ACLs: resource creation, then per-principal action grants.

use dcos_iam_api::Principal;
use dcos_iam_api::models::Acl;
use tracing::info;

use super::{Publisher, binding_outcome, create_or_update, record, report};
use crate::model::{AclEntry, BufferFile, List, OperationReport, Outcome, Phase, Resource};
use crate::pass::run_ordered;

impl Publisher<'_> {
    /// Create every ACL in `acls.json`.
    pub async fn publish_acls(&self) -> OperationReport {
        let acls: List<Acl> = match self.load(Resource::Acls, Phase::Primary, BufferFile::Acls) {
            Ok(doc) => doc,
            Err(aborted) => return aborted,
        };
        info!(count = acls.array.len(), "publishing acls");

        let rids: Vec<String> = acls.array.iter().map(|a| a.rid.clone()).collect();
        let results = run_ordered(acls.array, self.options.width(), self.cancel, |acl| async move {
            create_or_update(
                self.client.create_acl(&acl.rid, &acl.description),
                self.client.update_acl(&acl.rid, &acl.description),
            )
            .await
        })
        .await;

        let mut report = report(Resource::Acls, Phase::Primary);
        for (index, (rid, outcome)) in rids.into_iter().zip(results).enumerate() {
            record(&mut report, index, rid, outcome);
        }
        report
    }

    /// Grant every action listed in `acls_permissions.json`.
    pub async fn publish_acl_permissions(&self) -> OperationReport {
        let doc: List<AclEntry> =
            match self.load(Resource::Acls, Phase::Relationships, BufferFile::AclsPermissions) {
                Ok(doc) => doc,
                Err(aborted) => return aborted,
            };

        let rids: Vec<String> = doc.array.iter().map(|a| a.rid.clone()).collect();
        let results = run_ordered(doc.array, self.options.width(), self.cancel, |entry| {
            self.grant_acl(entry)
        })
        .await;

        let mut report = report(Resource::Acls, Phase::Relationships);
        let mut index = 0;
        for (rid, grants) in rids.into_iter().zip(results) {
            match grants {
                Some(grants) => {
                    for (target, outcome) in grants {
                        record(&mut report, index, target, Some(outcome));
                        index += 1;
                    }
                }
                None => {
                    record(&mut report, index, rid, None);
                    index += 1;
                }
            }
        }
        report
    }

    async fn grant_acl(&self, entry: AclEntry) -> Vec<(String, Outcome)> {
        let mut out = Vec::new();

        for user in &entry.users {
            for action in &user.actions {
                let result = self
                    .client
                    .grant_acl_action(&entry.rid, Principal::User(&user.uid), &action.name)
                    .await;
                out.push((
                    format!("{} user:{} {}", entry.rid, user.uid, action.name),
                    binding_outcome(result),
                ));
            }
        }

        for group in &entry.groups {
            for action in &group.actions {
                let result = self
                    .client
                    .grant_acl_action(&entry.rid, Principal::Group(&group.gid), &action.name)
                    .await;
                out.push((
                    format!("{} group:{} {}", entry.rid, group.gid, action.name),
                    binding_outcome(result),
                ));
            }
        }

        out
    }
}
