//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `railgen-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `TemplateStore`: Template set retrieval
//!   - `TemplateRenderer`: Template rendering
//!   - `CommandRunner`: External processes (`git init`)
//!   - `Progress`: Step reporting, implemented by the CLI

pub mod output;

#[cfg(test)]
pub use output::{MockCommandRunner, MockFilesystem};
pub use output::{CommandRunner, Filesystem, NoProgress, Progress, TemplateRenderer, TemplateStore};
