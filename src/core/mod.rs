// Core Layer
pub mod orchestrator;
pub mod worker;


pub use orchestrator::{create_archive, Zipper};
pub use worker::{spawn_archive_worker, ArchiveWorker};
