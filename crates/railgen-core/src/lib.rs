//! railgen core - hexagonal architecture implementation
//!
//! This crate provides the domain and application layers for the railgen
//! project generator, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           railgen-cli (CLI)             │
//! │   prompts, signal hooks, progress UI    │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  ScaffoldService → Coordinator          │
//! │      BackupStore, RollbackEngine        │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ Filesystem, TemplateStore, Renderer,    │
//! │ CommandRunner, Progress                 │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    railgen-adapters (Infrastructure)    │
//! └─────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ ProjectConfig, CreationLedger,          │
//! │ RollbackRecord, TemplateSet             │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use railgen_core::prelude::*;
//!
//! let config = ProjectConfig::resolve("my-shop", &GenerateOptions::default(), &cwd)?;
//! let service = ScaffoldService::new(store, renderer, filesystem, runner, progress, backup_root);
//! match service.generate(&config, &NoProgress) {
//!     Ok(summary) => println!("created {}", summary.project_path.display()),
//!     Err(failure) => eprintln!("{} (rolled back)", failure.error),
//! }
//! ```

pub mod domain;

pub mod application;

pub mod error;

/// Public API - what external crates should use.
pub mod prelude {
    pub use crate::application::{
        BackupStore, Coordinator, Decision, GenerationSummary, NoProgress, RollbackEngine,
        RunFailure, ScaffoldService, SignalKind,
        ports::{CommandRunner, Filesystem, Progress, TemplateRenderer, TemplateStore},
    };
    pub use crate::domain::{
        BuildTool, CreationLedger, Database, Features, GenerateOptions, PackageManager,
        ProjectConfig, RenderContext, RollbackRecord, TemplateSet,
    };
    pub use crate::error::{RailgenError, RailgenResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
