//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish the engine's
//! use cases: resolve a pattern, project matches, archive a staging tree,
//! assemble a whole package.

pub mod archive_service;
pub mod assembly_service;
pub mod pattern_matcher;
pub mod projection_service;
pub mod projector;

pub use archive_service::ArchiveService;
pub use assembly_service::{AssemblyReport, AssemblyService, ModuleReport};
pub use pattern_matcher::PatternMatcher;
pub use projection_service::{ProjectionReport, ProjectionService};
pub use projector::DirectoryProjector;
