// Users and their group memberships / permissions.

use dcos_iam_api::models::User;
use tracing::{info, warn};

use super::{Fetcher, element_outcome, reports};
use crate::model::{BufferFile, List, OperationReport, Outcome, Resource, UserEntry};
use crate::pass::run_ordered;

impl Fetcher<'_> {
    /// `GET /users`, then per user its groups and direct permissions.
    ///
    /// Writes `users.json` (raw) and `users_groups.json`.
    pub async fn fetch_users(&self) -> Vec<OperationReport> {
        let (mut primary, mut relations) = reports(Resource::Users);

        let Some(users) = self
            .primary::<List<User>, _>(Resource::Users, &mut primary, self.client.users_raw())
            .await
        else {
            return vec![primary];
        };
        info!(count = users.array.len(), "fetched users");

        let uids: Vec<String> = users.array.iter().map(|u| u.uid.clone()).collect();
        let results = run_ordered(users.array, self.options.width(), self.cancel, |user| {
            self.user_entry(user)
        })
        .await;

        let mut doc = List { array: Vec::new() };
        for (uid, result) in uids.into_iter().zip(results) {
            match result {
                Some((entry, outcome)) => {
                    doc.array.push(entry);
                    relations.push(uid, outcome);
                }
                None => relations.push(uid, Outcome::Cancelled),
            }
        }

        self.persist_doc(BufferFile::UsersGroups, &doc, &mut relations);
        vec![primary, relations]
    }

    async fn user_entry(&self, user: User) -> (UserEntry, Outcome) {
        let mut errors = Vec::new();

        let groups = match self.client.user_groups(&user.uid).await {
            Ok(groups) => groups,
            Err(e) => {
                warn!(operation = "GET", resource = "users", target = %user.uid, error = %e, "memberships unavailable");
                errors.push(format!("groups: {e}"));
                Vec::new()
            }
        };

        let permissions = match self.client.user_permissions(&user.uid).await {
            Ok(permissions) => permissions,
            Err(e) => {
                warn!(operation = "GET", resource = "users", target = %user.uid, error = %e, "permissions unavailable");
                errors.push(format!("permissions: {e}"));
                Vec::new()
            }
        };

        let entry = UserEntry {
            uid: user.uid,
            url: user.url,
            description: user.description,
            is_remote: user.is_remote,
            is_service: user.is_service,
            groups,
            permissions,
        };
        (entry, element_outcome(&errors))
    }
}
