pub mod common;
pub mod config;
pub mod ledger;
pub mod project_structure;
pub mod record;
pub mod snapshot;
pub mod template;

pub use crate::domain::DomainError;
pub use config::{Features, GenerateOptions, ProjectConfig};
pub use ledger::CreationLedger;
pub use project_structure::ProjectStructure;
pub use record::{RollbackRecord, RunState};
pub use snapshot::BackupSnapshot;
pub use template::{RenderContext, TemplateSet};
