//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish the
//! high-level use cases: generate a project, back it up, roll it back.

pub mod backup;
pub mod coordinator;
pub mod rollback;
pub mod scaffold;

pub use backup::{BackupStore, DEFAULT_BACKUP_DIR, StoredSnapshot};
pub use coordinator::{
    ActiveRun, Coordinator, Decision, ErrorHint, GENERIC_HINT, SignalKind, hint_for,
};
pub use rollback::{RollbackEngine, RollbackReport, RollbackStep, StepOutcome, StepStatus};
pub use scaffold::{GenerationSummary, RunFailure, ScaffoldService};
