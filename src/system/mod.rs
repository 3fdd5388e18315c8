// System Layer
pub mod access;
pub mod archive;
pub mod cleanup;
pub mod coordination;
pub mod staging;

pub use access::{AccessHandle, AccessScope, FilesystemAccessScope, ResourceAccessGuard};
pub use archive::ArchiveBuilder;
pub use cleanup::{CleanupCoordinator, CleanupReport};
pub use coordination::{coordinate_read, LocalReadCoordinator, ReadCoordinator, ReadLease};
pub use staging::StagingAssembler;
