// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Stager.
//!
//! This module contains pure logic: parsing patterns, computing relative
//! paths and deciding where each matched entry lands. All I/O is handled via
//! ports (traits) defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Few crates**: std, thiserror, serde, and glob for syntax checks only
//! - **Immutable values**: Domain objects are Clone + PartialEq
pub mod config;
pub mod entry;
pub mod error;
pub mod match_set;
pub mod path_resolver;
pub mod pattern;
pub mod plan;

pub use config::{ArchiveSettings, Compression, DEFAULT_METADATA_DIR, EngineConfig, SourcePolicy};
pub use entry::{EntryDescriptor, EntryInfo, EntryKind};
pub use error::{DomainError, ErrorCategory};
pub use match_set::{MatchKind, MatchSet, MatchedEntry};
pub use path_resolver::relative_path;
pub use pattern::{Pattern, PatternKind};
pub use plan::{AssemblyPlan, ModuleSpec};
