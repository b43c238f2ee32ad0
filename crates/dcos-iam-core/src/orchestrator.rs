// ── Orchestrator ──
//
// Sequences fetchers and publishers for single-resource and full runs, and
// keeps the per-resource state table the menu shows. The table is display
// state only; nothing in the engine reads it back.

use std::collections::HashMap;

use dcos_iam_api::AcsClient;
use serde::Serialize;
use strum::Display;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::fetch::Fetcher;
use crate::model::{
    AgentSummary, BufferFile, Direction, OperationReport, OperationStatus, Outcome, Phase,
    Resource, combined_status,
};
use crate::publish::Publisher;
use crate::session::{PublishDefaults, SessionConfig, SyncOptions};
use crate::store::BufferStore;

// ── State table ──────────────────────────────────────────────────

/// Last known result of a GET or PUT for one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display)]
pub enum OpState {
    #[default]
    #[strum(serialize = "not done")]
    NotDone,
    #[strum(serialize = "done")]
    Done,
    #[strum(serialize = "partial")]
    Partial,
    #[strum(serialize = "error")]
    Error,
}

impl From<OperationStatus> for OpState {
    fn from(status: OperationStatus) -> Self {
        match status {
            OperationStatus::Success => Self::Done,
            OperationStatus::Partial => Self::Partial,
            OperationStatus::Failure => Self::Error,
        }
    }
}

/// `(resource, direction) → state`, everything `NotDone` until run.
#[derive(Debug, Clone, Default)]
pub struct StateTable {
    states: HashMap<(Resource, Direction), OpState>,
}

impl StateTable {
    pub fn get(&self, resource: Resource, direction: Direction) -> OpState {
        self.states
            .get(&(resource, direction))
            .copied()
            .unwrap_or_default()
    }

    pub fn set(&mut self, resource: Resource, direction: Direction, state: OpState) {
        self.states.insert((resource, direction), state);
    }

    /// Record the combined verdict of `reports` for every resource they cover.
    fn record(&mut self, direction: Direction, reports: &[OperationReport]) {
        let mut resources: Vec<Resource> = reports.iter().map(|r| r.resource).collect();
        resources.sort_unstable();
        resources.dedup();
        for resource in resources {
            let status = combined_status(reports.iter().filter(|r| r.resource == resource));
            self.set(resource, direction, status.into());
        }
    }
}

// ── Run summary ──────────────────────────────────────────────────

/// Everything one orchestrated operation produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub reports: Vec<OperationReport>,
    /// Present after an agents fetch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agents: Option<AgentSummary>,
}

impl RunSummary {
    fn from_reports(reports: Vec<OperationReport>) -> Self {
        Self {
            reports,
            agents: None,
        }
    }

    pub fn status(&self) -> OperationStatus {
        combined_status(&self.reports)
    }
}

// ── Orchestrator ─────────────────────────────────────────────────

/// Owns the client and buffer for a session and runs operations on them.
pub struct Orchestrator {
    client: AcsClient,
    buffer: BufferStore,
    options: SyncOptions,
    defaults: PublishDefaults,
    /// Token for the current operation, replaced by [`Self::arm`].
    current: CancellationToken,
    state: StateTable,
}

impl Orchestrator {
    pub fn new(
        client: AcsClient,
        buffer: BufferStore,
        options: SyncOptions,
        defaults: PublishDefaults,
    ) -> Self {
        Self {
            client,
            buffer,
            options,
            defaults,
            current: CancellationToken::new(),
            state: StateTable::default(),
        }
    }

    /// Build from a session config and an authenticated client.
    pub fn from_session(config: &SessionConfig, client: AcsClient) -> Self {
        Self::new(
            client,
            BufferStore::new(&config.data_dir),
            config.sync,
            config.defaults.clone(),
        )
    }

    pub fn buffer(&self) -> &BufferStore {
        &self.buffer
    }

    pub fn state(&self) -> &StateTable {
        &self.state
    }

    /// Fresh cancellation token for the next operation.
    ///
    /// A cancelled operation leaves its token cancelled; arming replaces it
    /// so the following operation starts clean.
    pub fn arm(&mut self) -> CancellationToken {
        self.current = CancellationToken::new();
        self.current.clone()
    }

    fn fetcher(&self) -> Fetcher<'_> {
        Fetcher::new(&self.client, &self.buffer, self.options, &self.current)
    }

    fn publisher(&self) -> Publisher<'_> {
        Publisher::new(
            &self.client,
            &self.buffer,
            self.options,
            &self.defaults,
            &self.current,
        )
    }

    // ── Single resource ──────────────────────────────────────────

    /// Fetch one resource into the buffer.
    pub async fn get(&mut self, resource: Resource) -> RunSummary {
        info!(operation = "GET", resource = %resource, "starting");
        let summary = self.fetch_one(resource).await;
        self.state.record(Direction::Get, &summary.reports);
        log_summary(Direction::Get, &summary);
        summary
    }

    /// Publish one resource from the buffer: creation then bindings.
    pub async fn put(&mut self, resource: Resource) -> RunSummary {
        info!(operation = "PUT", resource = %resource, "starting");
        let summary = {
            let publisher = self.publisher();
            let reports = match resource {
                Resource::Users => vec![
                    publisher.publish_users().await,
                    publisher.publish_user_memberships().await,
                ],
                Resource::Groups => vec![
                    publisher.publish_groups().await,
                    publisher.publish_group_memberships().await,
                ],
                Resource::Acls => vec![
                    publisher.publish_acls().await,
                    publisher.publish_acl_permissions().await,
                ],
                Resource::Ldap => vec![publisher.publish_ldap().await],
                Resource::ServiceGroups => vec![publisher.publish_service_groups().await],
                Resource::Agents => vec![read_only(resource)],
            };
            RunSummary::from_reports(reports)
        };
        self.state.record(Direction::Put, &summary.reports);
        log_summary(Direction::Put, &summary);
        summary
    }

    async fn fetch_one(&self, resource: Resource) -> RunSummary {
        let fetcher = self.fetcher();
        match resource {
            Resource::Users => RunSummary::from_reports(fetcher.fetch_users().await),
            Resource::Groups => RunSummary::from_reports(fetcher.fetch_groups().await),
            Resource::Acls => RunSummary::from_reports(fetcher.fetch_acls().await),
            Resource::Ldap => RunSummary::from_reports(fetcher.fetch_ldap().await),
            Resource::ServiceGroups => {
                RunSummary::from_reports(fetcher.fetch_service_groups().await)
            }
            Resource::Agents => {
                let (reports, agents) = fetcher.fetch_agents().await;
                RunSummary { reports, agents }
            }
        }
    }

    // ── Full runs ────────────────────────────────────────────────

    /// Fetch every resource. One resource failing does not stop the rest.
    pub async fn fetch_all(&mut self) -> RunSummary {
        info!(operation = "GET", resource = "all", "starting");
        let mut all = RunSummary::default();
        for resource in [
            Resource::Users,
            Resource::Groups,
            Resource::Acls,
            Resource::Ldap,
            Resource::ServiceGroups,
            Resource::Agents,
        ] {
            let summary = self.fetch_one(resource).await;
            self.state.record(Direction::Get, &summary.reports);
            all.reports.extend(summary.reports);
            if summary.agents.is_some() {
                all.agents = summary.agents;
            }
        }
        log_summary(Direction::Get, &all);
        all
    }

    /// Publish everything: all creations, then all bindings, then service
    /// groups, then LDAP. Each pass finishes before the next starts.
    pub async fn publish_all(&mut self) -> RunSummary {
        info!(operation = "PUT", resource = "all", "starting");
        let reports = {
            let publisher = self.publisher();
            vec![
                publisher.publish_users().await,
                publisher.publish_groups().await,
                publisher.publish_acls().await,
                publisher.publish_user_memberships().await,
                publisher.publish_group_memberships().await,
                publisher.publish_acl_permissions().await,
                publisher.publish_service_groups().await,
                publisher.publish_ldap().await,
            ]
        };
        let summary = RunSummary::from_reports(reports);
        self.state.record(Direction::Put, &summary.reports);
        log_summary(Direction::Put, &summary);
        summary
    }
}

fn read_only(resource: Resource) -> OperationReport {
    let mut report = OperationReport::new(resource, Direction::Put, Phase::Primary);
    report.push(
        BufferFile::Agents.to_string(),
        Outcome::Skipped("agents are read-only".into()),
    );
    report
}

fn log_summary(direction: Direction, summary: &RunSummary) {
    let failed: usize = summary.reports.iter().map(OperationReport::failed).sum();
    match summary.status() {
        OperationStatus::Success => info!(operation = %direction, "finished"),
        status => warn!(operation = %direction, %status, failed, "finished with failures"),
    }
}
