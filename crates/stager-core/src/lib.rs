//! Stager Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Stager, the
//! pattern-based projection and archiving engine used to assemble a
//! deployable package from multi-module build outputs.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           stager-cli (CLI)              │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (Projection, Archive, Assembly)         │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │     (Driven: Filesystem, Archiver)      │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    stager-adapters (Infrastructure)     │
//! │ (LocalFilesystem, MemoryFilesystem,     │
//! │  ZipArchiver)                           │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Pattern, MatchSet, PathResolver)       │
//! │              No I/O                     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stager_core::{application::ProjectionService, domain::EngineConfig};
//!
//! // `filesystem` is any `Filesystem` adapter, e.g. `LocalFilesystem`.
//! let service = ProjectionService::new(filesystem, &EngineConfig::default());
//! service.project("ui/dist", "target/staging/ui", &["*"]).unwrap();
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ArchiveService, AssemblyService, DirectoryProjector, PatternMatcher, ProjectionService,
        ports::{ArchiveWriter, Filesystem},
    };
    pub use crate::domain::{
        ArchiveSettings, AssemblyPlan, Compression, EngineConfig, EntryDescriptor, EntryInfo,
        MatchKind, MatchSet, MatchedEntry, ModuleSpec, Pattern, PatternKind, SourcePolicy,
    };
    pub use crate::error::{Context, StagerError, StagerResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
