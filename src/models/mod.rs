// Data Models
pub mod blob;
pub mod pipeline;
pub mod source;
pub mod staging_root;

pub use blob::ArchiveBlob;
pub use pipeline::{CancelFlag, PipelineState};
pub use source::{ScopeToken, SourceKind, SourcePath};
pub use staging_root::{StagingLayout, StagingRoot};
