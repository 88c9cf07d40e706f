//! Infrastructure adapters for Stager.
//!
//! This crate implements the ports defined in `stager-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod archive;
pub mod filesystem;
pub mod plan_loader;

// Re-export commonly used adapters
pub use archive::ZipArchiver;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use plan_loader::PlanLoader;
