//! PUT side of the sync engine.
//!
//! Publishing replays the buffer onto a cluster in two passes per resource:
//! a creation pass over the primary file, then a binding pass over the
//! relationship file. Binding endpoints reject unknown principals, so the
//! creation pass must have been attempted for every element first.
//!
//! Replays are idempotent against a cluster that already holds the data:
//! a creation answered with 409 Conflict becomes a description update, and
//! a binding that already exists is recorded as skipped.

mod acls;
mod groups;
mod ldap;
mod service_groups;
mod users;

pub use service_groups::sanitize;

use dcos_iam_api::AcsClient;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::model::{BufferFile, Direction, OperationReport, Outcome, Phase, Resource};
use crate::session::{PublishDefaults, SyncOptions};
use crate::store::BufferStore;

const CONFLICT: u16 = 409;

/// Borrowed context for one PUT operation.
pub struct Publisher<'a> {
    client: &'a AcsClient,
    buffer: &'a BufferStore,
    options: SyncOptions,
    defaults: &'a PublishDefaults,
    cancel: &'a CancellationToken,
}

impl<'a> Publisher<'a> {
    pub fn new(
        client: &'a AcsClient,
        buffer: &'a BufferStore,
        options: SyncOptions,
        defaults: &'a PublishDefaults,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            client,
            buffer,
            options,
            defaults,
            cancel,
        }
    }

    /// Load a buffer file for a pass, or produce the report that aborts it.
    ///
    /// No request is made when the file is missing or unreadable.
    fn load<T: DeserializeOwned>(
        &self,
        resource: Resource,
        phase: Phase,
        file: BufferFile,
    ) -> Result<T, OperationReport> {
        self.buffer.read_doc(file).map_err(|e| {
            warn!(operation = "PUT", resource = %resource, file = %file, error = %e, "buffer unavailable");
            OperationReport::aborted(resource, Direction::Put, phase, file.to_string(), e.to_string())
        })
    }
}

/// Outcome of a creation request, turning a conflict into an update.
///
/// `update` is only polled when the entity already exists.
async fn create_or_update<C, U>(create: C, update: U) -> Outcome
where
    C: Future<Output = Result<(), dcos_iam_api::Error>>,
    U: Future<Output = Result<(), dcos_iam_api::Error>>,
{
    match create.await {
        Ok(()) => Outcome::Ok,
        Err(e) if e.status() == Some(CONFLICT) => match update.await {
            Ok(()) => Outcome::Ok,
            Err(e) => Outcome::Failed(format!("exists, update failed: {e}")),
        },
        Err(e) => Outcome::Failed(e.to_string()),
    }
}

/// Outcome of a binding request; an existing binding is not an error.
fn binding_outcome(result: Result<(), dcos_iam_api::Error>) -> Outcome {
    match result {
        Ok(()) => Outcome::Ok,
        Err(e) if e.status() == Some(CONFLICT) => Outcome::Skipped("already exists".into()),
        Err(e) => Outcome::Failed(e.to_string()),
    }
}

/// Log one element's outcome and add it to the report.
///
/// `None` means the element was never dispatched because of cancellation.
fn record(report: &mut OperationReport, index: usize, target: String, outcome: Option<Outcome>) {
    let outcome = outcome.unwrap_or(Outcome::Cancelled);
    match &outcome {
        Outcome::Failed(reason) => warn!(
            operation = "PUT",
            resource = %report.resource,
            phase = %report.phase,
            target = %target,
            index,
            error = %reason,
            "element failed"
        ),
        other => debug!(
            operation = "PUT",
            resource = %report.resource,
            phase = %report.phase,
            target = %target,
            index,
            outcome = ?other,
            "element done"
        ),
    }
    report.push(target, outcome);
}

fn report(resource: Resource, phase: Phase) -> OperationReport {
    OperationReport::new(resource, Direction::Put, phase)
}
