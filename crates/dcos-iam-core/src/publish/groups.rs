// Groups: creation, then members.

use dcos_iam_api::models::Group;
use tracing::info;

use super::{Publisher, binding_outcome, create_or_update, record, report};
use crate::model::{BufferFile, GroupEntry, List, OperationReport, Outcome, Phase, Resource};
use crate::pass::run_ordered;

impl Publisher<'_> {
    /// Create every group in `groups.json`.
    pub async fn publish_groups(&self) -> OperationReport {
        let groups: List<Group> =
            match self.load(Resource::Groups, Phase::Primary, BufferFile::Groups) {
                Ok(doc) => doc,
                Err(aborted) => return aborted,
            };
        info!(count = groups.array.len(), "publishing groups");

        let gids: Vec<String> = groups.array.iter().map(|g| g.gid.clone()).collect();
        let results = run_ordered(groups.array, self.options.width(), self.cancel, |group| async move {
            create_or_update(
                self.client.create_group(&group.gid, &group.description),
                self.client.update_group(&group.gid, &group.description),
            )
            .await
        })
        .await;

        let mut report = report(Resource::Groups, Phase::Primary);
        for (index, (gid, outcome)) in gids.into_iter().zip(results).enumerate() {
            record(&mut report, index, gid, outcome);
        }
        report
    }

    /// Add the members listed in `groups_users.json` to each group.
    pub async fn publish_group_memberships(&self) -> OperationReport {
        let doc: List<GroupEntry> =
            match self.load(Resource::Groups, Phase::Relationships, BufferFile::GroupsUsers) {
                Ok(doc) => doc,
                Err(aborted) => return aborted,
            };

        let gids: Vec<String> = doc.array.iter().map(|g| g.gid.clone()).collect();
        let results = run_ordered(doc.array, self.options.width(), self.cancel, |entry| {
            self.bind_group(entry)
        })
        .await;

        let mut report = report(Resource::Groups, Phase::Relationships);
        let mut index = 0;
        for (gid, bindings) in gids.into_iter().zip(results) {
            match bindings {
                Some(bindings) => {
                    for (target, outcome) in bindings {
                        record(&mut report, index, target, Some(outcome));
                        index += 1;
                    }
                }
                None => {
                    record(&mut report, index, gid, None);
                    index += 1;
                }
            }
        }
        report
    }

    async fn bind_group(&self, entry: GroupEntry) -> Vec<(String, Outcome)> {
        let mut out = Vec::with_capacity(entry.users.len());
        for membership in &entry.users {
            let uid = &membership.user.uid;
            let result = self.client.add_group_member(&entry.gid, uid).await;
            out.push((format!("{uid} -> {}", entry.gid), binding_outcome(result)));
        }
        out
    }
}
