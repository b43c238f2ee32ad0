//! GET/PUT sync engine between a DC/OS cluster and a local JSON buffer.
//!
//! - **[`Fetcher`]** walks a resource's relationships (user → groups,
//!   group → users, ACL → permissions → action values) and writes the
//!   primary body verbatim plus an assembled relationship document.
//!
//! - **[`BufferStore`]** owns the on-disk buffer: one JSON file per
//!   collection, whole-file atomic replace, typed not-found.
//!
//! - **[`Publisher`]** replays the buffer onto a cluster, creation before
//!   binding, with per-element outcomes instead of log-only failures.
//!
//! - **[`Orchestrator`]** sequences single-resource and full runs and keeps
//!   the display state table.
//!
//! - **[`BackupStore`]** saves and restores named copies of the buffer.

pub mod error;
pub mod fetch;
pub mod model;
pub mod orchestrator;
pub mod publish;
pub mod session;
pub mod store;

mod pass;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use fetch::Fetcher;
pub use model::{
    AclEntry, AgentSummary, BufferFile, Direction, ElementOutcome, GroupEntry, OperationReport,
    OperationStatus, Outcome, Phase, Resource, UserEntry,
};
pub use orchestrator::{OpState, Orchestrator, RunSummary, StateTable};
pub use publish::{Publisher, sanitize};
pub use session::{PublishDefaults, SessionConfig, SyncOptions, connect, login, resume};
pub use store::{BackupInfo, BackupStore, BufferStore, CheckReport, CheckRow};
