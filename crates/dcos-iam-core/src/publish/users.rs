// Users: account creation, then group memberships.

use dcos_iam_api::UserCredential;
use dcos_iam_api::models::User;
use tracing::info;

use super::{Publisher, binding_outcome, create_or_update, record, report};
use crate::model::{BufferFile, List, OperationReport, Outcome, Phase, Resource, UserEntry};
use crate::pass::run_ordered;

impl Publisher<'_> {
    /// Create every user in `users.json`.
    ///
    /// Regular users get the default password; service accounts get their
    /// buffered public key, or the default secret when they have none.
    pub async fn publish_users(&self) -> OperationReport {
        let users: List<User> =
            match self.load(Resource::Users, Phase::Primary, BufferFile::Users) {
                Ok(doc) => doc,
                Err(aborted) => return aborted,
            };
        info!(count = users.array.len(), "publishing users");

        let uids: Vec<String> = users.array.iter().map(|u| u.uid.clone()).collect();
        let results = run_ordered(users.array, self.options.width(), self.cancel, |user| {
            self.create_user(user)
        })
        .await;

        let mut report = report(Resource::Users, Phase::Primary);
        for (index, (uid, outcome)) in uids.into_iter().zip(results).enumerate() {
            record(&mut report, index, uid, outcome);
        }
        report
    }

    async fn create_user(&self, user: User) -> Outcome {
        let credential = match (user.is_service, user.public_key.as_deref()) {
            (true, Some(key)) => UserCredential::PublicKey(key),
            (true, None) => UserCredential::Secret(&self.defaults.user_secret),
            (false, _) => UserCredential::Password(&self.defaults.user_password),
        };
        create_or_update(
            self.client
                .create_user(&user.uid, &user.description, credential),
            self.client.update_user(&user.uid, &user.description),
        )
        .await
    }

    /// Add every user in `users_groups.json` to its groups.
    pub async fn publish_user_memberships(&self) -> OperationReport {
        let doc: List<UserEntry> =
            match self.load(Resource::Users, Phase::Relationships, BufferFile::UsersGroups) {
                Ok(doc) => doc,
                Err(aborted) => return aborted,
            };

        let uids: Vec<String> = doc.array.iter().map(|u| u.uid.clone()).collect();
        let results = run_ordered(doc.array, self.options.width(), self.cancel, |entry| {
            self.bind_user(entry)
        })
        .await;

        let mut report = report(Resource::Users, Phase::Relationships);
        let mut index = 0;
        for (uid, bindings) in uids.into_iter().zip(results) {
            match bindings {
                Some(bindings) => {
                    for (target, outcome) in bindings {
                        record(&mut report, index, target, Some(outcome));
                        index += 1;
                    }
                }
                None => {
                    record(&mut report, index, uid, None);
                    index += 1;
                }
            }
        }
        report
    }

    async fn bind_user(&self, entry: UserEntry) -> Vec<(String, Outcome)> {
        let mut out = Vec::with_capacity(entry.groups.len());
        for membership in &entry.groups {
            let gid = &membership.group.gid;
            let result = self.client.add_group_member(gid, &entry.uid).await;
            out.push((format!("{} -> {gid}", entry.uid), binding_outcome(result)));
        }
        out
    }
}
