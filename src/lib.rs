//! 선택한 파일/폴더를 임시 디렉토리에 모아 zip 아카이브(메모리 상의 바이트)로 만듭니다.
//!
//! ```no_run
//! use itsuki_zipper::create_archive;
//!
//! let blob = create_archive(&["/home/me/photos"])?;
//! std::fs::write(blob.suggested_filename(), blob.bytes())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod core;
pub mod models;
pub mod system;
pub mod utils;

pub use crate::core::{create_archive, spawn_archive_worker, ArchiveWorker, Zipper};
pub use crate::models::{ArchiveBlob, CancelFlag, PipelineState, SourceKind, SourcePath};
pub use crate::utils::config::{CollisionPolicy, ZipperConfig};
pub use crate::utils::error::{ArchiveError, ArchiveErrorKind, ConfigError, Result};
