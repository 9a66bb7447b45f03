//! Core domain layer for railgen.
//!
//! Pure data and rules: project configuration, the creation ledger, the
//! rollback record, backup snapshot metadata and template sets. No I/O;
//! filesystem and process access live behind the ports defined in the
//! application layer.
//!
//! - **No async**: domain logic is synchronous
//! - **No I/O**: no filesystem, network, or external calls
//! - **Rich domain model**: the record guards its own state machine, the
//!   ledger owns its flush semantics

pub mod entities;
pub mod error;
pub mod value_objects;

pub use entities::{config, ledger, record, snapshot, template};

pub use entities::{
    common::{Permissions, RelativePath},
    config::{Features, GenerateOptions, ProjectConfig},
    ledger::CreationLedger,
    project_structure::{DirectoryToCreate, FileToWrite, FsEntry, ProjectStructure},
    record::{RollbackRecord, RunState},
    snapshot::BackupSnapshot,
    template::{
        Component, Condition, Feature, RenderContext, TemplateContent, TemplateFile, TemplateSet,
    },
};

pub use error::{DomainError, ErrorCategory};

pub use value_objects::{BuildTool, Database, PackageManager, Version};
