// ── On-disk stores ──

pub mod backup;
pub mod buffer;
pub mod check;

pub use backup::{BackupInfo, BackupStore};
pub use buffer::BufferStore;
pub use check::{CheckReport, CheckRow};
