// Marathon service groups.
//
// The root group exists on every cluster and cannot be created, so only
// its immediate children are posted, each carrying its own subtree. A
// creation request may not declare apps alongside subgroups with a version
// tag, so every node is sanitized first.

use dcos_iam_api::models::ServiceGroup;
use tracing::info;

use super::{Publisher, binding_outcome, record, report};
use crate::model::{BufferFile, OperationReport, Phase, Resource};
use crate::pass::run_ordered;

/// A copy of `group` with `apps` emptied and `version` removed at every
/// level. The input is left untouched.
pub fn sanitize(group: &ServiceGroup) -> ServiceGroup {
    ServiceGroup {
        id: group.id.clone(),
        groups: group.groups.iter().map(sanitize).collect(),
        apps: Vec::new(),
        version: None,
        extra: group.extra.clone(),
    }
}

impl Publisher<'_> {
    /// Post each top-level group from `service_groups.json`.
    ///
    /// A group that already exists is recorded as skipped.
    pub async fn publish_service_groups(&self) -> OperationReport {
        let root: ServiceGroup =
            match self.load(Resource::ServiceGroups, Phase::Primary, BufferFile::ServiceGroups) {
                Ok(doc) => doc,
                Err(aborted) => return aborted,
            };

        let children: Vec<ServiceGroup> = sanitize(&root).groups;
        info!(count = children.len(), "publishing service groups");

        let ids: Vec<String> = children.iter().map(|g| g.id.clone()).collect();
        let results = run_ordered(children, self.options.width(), self.cancel, |group| async move {
            binding_outcome(self.client.create_service_group(&group).await)
        })
        .await;

        let mut report = report(Resource::ServiceGroups, Phase::Primary);
        for (index, (id, outcome)) in ids.into_iter().zip(results).enumerate() {
            record(&mut report, index, id, outcome);
        }
        report
    }
}
