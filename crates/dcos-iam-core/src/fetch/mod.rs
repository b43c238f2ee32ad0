//! GET side of the sync engine.
//!
//! Each fetch issues the primary collection request, writes the body to the
//! buffer verbatim, parses it, and then (for users, groups and ACLs) walks
//! every element to assemble a relationship document from further calls.
//!
//! A failed primary request ends the operation before anything is written,
//! so an earlier good buffer file survives. Failures inside a relationship
//! pass only affect their own element: the entry is still written with
//! whatever was gathered, and the report records the failure.

mod acls;
mod cluster;
mod groups;
mod ldap;
mod users;

use std::future::Future;

use dcos_iam_api::AcsClient;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::model::{BufferFile, Direction, OperationReport, Outcome, Phase, Resource};
use crate::session::SyncOptions;
use crate::store::BufferStore;

/// Borrowed context for one GET operation.
pub struct Fetcher<'a> {
    client: &'a AcsClient,
    buffer: &'a BufferStore,
    options: SyncOptions,
    cancel: &'a CancellationToken,
}

impl<'a> Fetcher<'a> {
    pub fn new(
        client: &'a AcsClient,
        buffer: &'a BufferStore,
        options: SyncOptions,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            client,
            buffer,
            options,
            cancel,
        }
    }

    /// Fetch, persist and parse a primary collection.
    ///
    /// Returns the parsed value when all three steps succeed. The raw body
    /// is written before parsing, so the buffer holds what the server sent
    /// even if it turns out not to parse.
    async fn primary<T, Fut>(
        &self,
        resource: Resource,
        report: &mut OperationReport,
        request: Fut,
    ) -> Option<T>
    where
        T: DeserializeOwned,
        Fut: Future<Output = Result<String, dcos_iam_api::Error>>,
    {
        let file = resource.primary_file();
        if self.cancel.is_cancelled() {
            report.push(file.to_string(), Outcome::Cancelled);
            return None;
        }

        let body = match request.await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    operation = "GET",
                    resource = %resource,
                    status = ?e.status(),
                    error = %e,
                    "primary request failed"
                );
                report.push(file.to_string(), Outcome::Failed(e.to_string()));
                return None;
            }
        };

        if let Some(parsed) = self.persist_and_parse(resource, file, &body, report) {
            report.push(file.to_string(), Outcome::Ok);
            return Some(parsed);
        }
        None
    }

    fn persist_and_parse<T: DeserializeOwned>(
        &self,
        resource: Resource,
        file: BufferFile,
        body: &str,
        report: &mut OperationReport,
    ) -> Option<T> {
        if let Err(e) = self.buffer.write_raw(file, body) {
            warn!(operation = "GET", resource = %resource, error = %e, "buffer write failed");
            report.push(file.to_string(), Outcome::Failed(e.to_string()));
            return None;
        }
        debug!(resource = %resource, file = %file, bytes = body.len(), "stored raw body");

        match serde_json::from_str(body) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(operation = "GET", resource = %resource, error = %e, "response did not parse");
                report.push(
                    file.to_string(),
                    Outcome::Failed(format!("response did not parse: {e}")),
                );
                None
            }
        }
    }

    /// Write an assembled relationship document and record the result.
    fn persist_doc<T: serde::Serialize>(
        &self,
        file: BufferFile,
        doc: &T,
        report: &mut OperationReport,
    ) {
        if let Err(e) = self.buffer.write_doc(file, doc) {
            warn!(operation = "GET", file = %file, error = %e, "buffer write failed");
            report.push(file.to_string(), Outcome::Failed(e.to_string()));
        }
    }
}

fn reports(resource: Resource) -> (OperationReport, OperationReport) {
    (
        OperationReport::new(resource, Direction::Get, Phase::Primary),
        OperationReport::new(resource, Direction::Get, Phase::Relationships),
    )
}

/// Collapse the errors gathered for one element into its outcome.
fn element_outcome(errors: &[String]) -> Outcome {
    if errors.is_empty() {
        Outcome::Ok
    } else {
        Outcome::Failed(errors.join("; "))
    }
}
