// Groups and their members / permissions.

use dcos_iam_api::models::Group;
use tracing::{info, warn};

use super::{Fetcher, element_outcome, reports};
use crate::model::{BufferFile, GroupEntry, List, OperationReport, Outcome, Resource};
use crate::pass::run_ordered;

impl Fetcher<'_> {
    /// `GET /groups`, then per group its members and permissions.
    ///
    /// Writes `groups.json` (raw) and `groups_users.json`.
    pub async fn fetch_groups(&self) -> Vec<OperationReport> {
        let (mut primary, mut relations) = reports(Resource::Groups);

        let Some(groups) = self
            .primary::<List<Group>, _>(Resource::Groups, &mut primary, self.client.groups_raw())
            .await
        else {
            return vec![primary];
        };
        info!(count = groups.array.len(), "fetched groups");

        let gids: Vec<String> = groups.array.iter().map(|g| g.gid.clone()).collect();
        let results = run_ordered(groups.array, self.options.width(), self.cancel, |group| {
            self.group_entry(group)
        })
        .await;

        let mut doc = List { array: Vec::new() };
        for (gid, result) in gids.into_iter().zip(results) {
            match result {
                Some((entry, outcome)) => {
                    doc.array.push(entry);
                    relations.push(gid, outcome);
                }
                None => relations.push(gid, Outcome::Cancelled),
            }
        }

        self.persist_doc(BufferFile::GroupsUsers, &doc, &mut relations);
        vec![primary, relations]
    }

    async fn group_entry(&self, group: Group) -> (GroupEntry, Outcome) {
        let mut errors = Vec::new();

        let users = match self.client.group_users(&group.gid).await {
            Ok(users) => users,
            Err(e) => {
                warn!(operation = "GET", resource = "groups", target = %group.gid, error = %e, "members unavailable");
                errors.push(format!("users: {e}"));
                Vec::new()
            }
        };

        let permissions = match self.client.group_permissions(&group.gid).await {
            Ok(permissions) => permissions,
            Err(e) => {
                warn!(operation = "GET", resource = "groups", target = %group.gid, error = %e, "permissions unavailable");
                errors.push(format!("permissions: {e}"));
                Vec::new()
            }
        };

        let entry = GroupEntry {
            gid: group.gid,
            url: group.url,
            description: group.description,
            users,
            permissions,
        };
        (entry, element_outcome(&errors))
    }
}
