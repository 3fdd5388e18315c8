//! 스테이징 루트 모델
//!
//! 요청마다 고유한 임시 디렉토리 하나를 소유합니다. 그 아래에 아카이브가 될
//! 디렉토리 트리를 복사해 두고, 요청이 끝나면 통째로 삭제합니다.

use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// 스테이징 레이아웃
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingLayout {
    /// 아직 채워지지 않음
    Empty,
    /// 디렉토리 하나: 최상위 폴더 이름을 아카이브에 유지
    SingleDirectory,
    /// 여러 소스 또는 파일 하나: 고정 이름 디렉토리 아래에 나란히 복사
    Flat,
}

#[derive(Debug)]
pub struct StagingRoot {
    request_id: String,
    request_dir: PathBuf,
    staging_dir: Option<PathBuf>,
    layout: StagingLayout,
    created_at: DateTime<Local>,
    entries: BTreeSet<OsString>,
}

impl StagingRoot {
    /// 새 요청 식별자 (프로세스 ID + 시각 + 카운터)
    pub fn next_request_id(now: &DateTime<Local>) -> String {
        let seq = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        format!(
            "{}-{}-{}",
            process::id(),
            now.format("%Y%m%d%H%M%S%f"),
            seq
        )
    }

    pub(crate) fn new(
        request_id: String,
        request_dir: PathBuf,
        created_at: DateTime<Local>,
    ) -> Self {
        Self {
            request_id,
            request_dir,
            staging_dir: None,
            layout: StagingLayout::Empty,
            created_at,
            entries: BTreeSet::new(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// 요청 전용 디렉토리 (정리 대상)
    pub fn request_dir(&self) -> &Path {
        &self.request_dir
    }

    /// 아카이브 내용이 복사된 디렉토리
    pub fn staging_dir(&self) -> Option<&Path> {
        self.staging_dir.as_deref()
    }

    pub fn layout(&self) -> StagingLayout {
        self.layout
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    /// 아카이브 엔트리 이름의 기준 경로
    ///
    /// 단일 디렉토리는 요청 디렉토리를 기준으로 삼아 최상위 폴더 이름이 엔트리에 남습니다.
    pub fn archive_base(&self) -> &Path {
        match (self.layout, self.staging_dir.as_deref()) {
            (StagingLayout::Flat, Some(dir)) => dir,
            _ => &self.request_dir,
        }
    }

    /// 지금까지 복사된 최상위 이름
    pub fn entries(&self) -> &BTreeSet<OsString> {
        &self.entries
    }

    pub fn contains_entry(&self, name: impl AsRef<OsStr>) -> bool {
        self.entries.contains(name.as_ref())
    }

    pub(crate) fn set_staging_dir(&mut self, dir: PathBuf, layout: StagingLayout) {
        self.staging_dir = Some(dir);
        self.layout = layout;
        self.entries.clear();
    }

    pub(crate) fn record_entry(&mut self, name: OsString) {
        self.entries.insert(name);
    }
}
