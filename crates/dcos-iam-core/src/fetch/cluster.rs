// Agents (Mesos) and service groups (Marathon): single-call fetches.

use dcos_iam_api::models::{AgentList, ServiceGroup};
use tracing::info;

use super::Fetcher;
use crate::model::{AgentSummary, Direction, OperationReport, Phase, Resource};

impl Fetcher<'_> {
    /// `GET /mesos/slaves`, stored verbatim in `agents.json`.
    ///
    /// Returns hostnames split by the `active` flag for display.
    pub async fn fetch_agents(&self) -> (Vec<OperationReport>, Option<AgentSummary>) {
        let mut report = OperationReport::new(Resource::Agents, Direction::Get, Phase::Primary);

        let summary = self
            .primary::<AgentList, _>(Resource::Agents, &mut report, self.client.agents_raw())
            .await
            .map(|list| {
                let (active, inactive): (Vec<_>, Vec<_>) =
                    list.slaves.into_iter().partition(|a| a.active);
                AgentSummary {
                    active: active.into_iter().map(|a| a.hostname).collect(),
                    inactive: inactive.into_iter().map(|a| a.hostname).collect(),
                }
            });

        if let Some(summary) = &summary {
            info!(
                active = summary.active.len(),
                inactive = summary.inactive.len(),
                "fetched agents"
            );
        }
        (vec![report], summary)
    }

    /// `GET /marathon/v2/groups`, stored verbatim in `service_groups.json`.
    pub async fn fetch_service_groups(&self) -> Vec<OperationReport> {
        let mut report =
            OperationReport::new(Resource::ServiceGroups, Direction::Get, Phase::Primary);

        if let Some(root) = self
            .primary::<ServiceGroup, _>(
                Resource::ServiceGroups,
                &mut report,
                self.client.service_groups_raw(),
            )
            .await
        {
            info!(top_level = root.groups.len(), "fetched service groups");
        }
        vec![report]
    }
}
