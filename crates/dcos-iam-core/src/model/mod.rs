// ── Domain model ──

pub mod documents;
pub mod outcome;
pub mod resource;

pub use documents::{AclEntry, AgentSummary, GroupEntry, List, UserEntry};
pub use outcome::{
    ElementOutcome, OperationReport, OperationStatus, Outcome, Phase, combined_status,
};
pub use resource::{BufferFile, Direction, Resource};
