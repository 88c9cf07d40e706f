//! Application layer for Stager.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (matching, projection, archiving,
//!   assembly)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The flattening contract itself lives in `crate::domain`; services decide
//! what to resolve and copy, and in which order.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    ArchiveService, AssemblyReport, AssemblyService, DirectoryProjector, ModuleReport,
    PatternMatcher, ProjectionReport, ProjectionService,
};

pub use ports::{ArchiveWriter, Filesystem, output::ArchiveReport};

pub use error::ApplicationError;
