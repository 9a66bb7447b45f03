//! Application layer for railgen.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (ScaffoldService, BackupStore,
//!   RollbackEngine, Coordinator)
//! - **Generators**: The steps a run executes
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business rules itself. Those live in `crate::domain`.

pub mod error;
pub mod generators;
pub mod ports;
pub mod services;

pub use services::{
    ActiveRun, BackupStore, Coordinator, Decision, GenerationSummary, RollbackEngine,
    RollbackReport, RunFailure, ScaffoldService, SignalKind,
};

pub use generators::{GeneratorStep, RunContext};

// Re-export port traits (for adapter implementation)
pub use ports::{CommandRunner, Filesystem, NoProgress, Progress, TemplateRenderer, TemplateStore};

pub use error::ApplicationError;
