// ── Operation outcomes ──
//
// Every fetch and publish returns a report of per-element outcomes instead
// of swallowing failures into log lines. The harness summarises these and
// derives the coarse done / partial / error state from them.

use serde::Serialize;
use strum::Display;

use super::resource::{Direction, Resource};

/// Result of acting on one element (a user, a membership, an action...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    Skipped(String),
    Failed(String),
    Cancelled,
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// An outcome tagged with the element it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementOutcome {
    pub target: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Which pass of an operation a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// The collection itself (list on GET, entity creation on PUT).
    Primary,
    /// Memberships, permissions and action bindings.
    Relationships,
}

/// Overall verdict of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Success,
    Partial,
    Failure,
}

/// Per-element outcomes of one pass over one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationReport {
    pub resource: Resource,
    pub direction: Direction,
    pub phase: Phase,
    pub outcomes: Vec<ElementOutcome>,
}

impl OperationReport {
    pub fn new(resource: Resource, direction: Direction, phase: Phase) -> Self {
        Self {
            resource,
            direction,
            phase,
            outcomes: Vec::new(),
        }
    }

    /// Record the outcome for one element.
    pub fn push(&mut self, target: impl Into<String>, outcome: Outcome) {
        self.outcomes.push(ElementOutcome {
            target: target.into(),
            outcome,
        });
    }

    /// A report for a pass that could not start at all.
    pub fn aborted(
        resource: Resource,
        direction: Direction,
        phase: Phase,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let mut report = Self::new(resource, direction, phase);
        report.push(target, Outcome::Failed(reason.into()));
        report
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Ok))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::is_failure)
    }

    pub fn cancelled(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Cancelled))
    }

    /// Elements that failed, with their reasons.
    pub fn failures(&self) -> impl Iterator<Item = &ElementOutcome> {
        self.outcomes.iter().filter(|e| e.outcome.is_failure())
    }

    /// Success when nothing failed or was cancelled, Failure when nothing
    /// went through, Partial otherwise. An empty pass is a success.
    pub fn status(&self) -> OperationStatus {
        let bad = self.failed() + self.cancelled();
        if bad == 0 {
            OperationStatus::Success
        } else if self.succeeded() + self.skipped() == 0 {
            OperationStatus::Failure
        } else {
            OperationStatus::Partial
        }
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|e| pred(&e.outcome)).count()
    }
}

/// Fold the verdicts of several reports into one.
pub fn combined_status<'a>(reports: impl IntoIterator<Item = &'a OperationReport>) -> OperationStatus {
    let mut any = false;
    let mut all_success = true;
    let mut all_failure = true;
    for status in reports.into_iter().map(OperationReport::status) {
        any = true;
        all_success &= status == OperationStatus::Success;
        all_failure &= status == OperationStatus::Failure;
    }
    if !any || all_success {
        OperationStatus::Success
    } else if all_failure {
        OperationStatus::Failure
    } else {
        OperationStatus::Partial
    }
}
