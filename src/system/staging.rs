//! 스테이징 디렉토리 구성
//!
//! 소스 목록을 요청 전용 임시 디렉토리 아래로 복사해 아카이브 루트를 만듭니다.
//!
//! - 디렉토리 하나: `<request>/<dir name>/...` (최상위 폴더 이름 유지)
//! - 그 외: `<request>/archive/<source name>...`

use crate::models::{CancelFlag, SourcePath, StagingLayout, StagingRoot};
use crate::utils::config::{CollisionPolicy, ZipperConfig};
use crate::utils::error::{ArchiveError, Result};
use crate::utils::naming::next_unique_name;
use chrono::Local;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

pub struct StagingAssembler<'a> {
    config: &'a ZipperConfig,
    cancel: &'a CancelFlag,
}

impl<'a> StagingAssembler<'a> {
    pub fn new(config: &'a ZipperConfig, cancel: &'a CancelFlag) -> Self {
        Self { config, cancel }
    }

    /// 요청 전용 디렉토리 생성
    ///
    /// 이름이 요청마다 달라서 동시에 여러 요청이 돌아도 서로의 파일을 건드리지 않습니다.
    pub fn allocate(&self) -> Result<StagingRoot> {
        let temp_root = self.config.temp_root();
        fs::create_dir_all(&temp_root).map_err(|e| ArchiveError::from_io(&temp_root, e))?;

        let now = Local::now();
        let request_id = StagingRoot::next_request_id(&now);
        let request_dir = temp_root.join(format!("{}-{}", self.config.staging_prefix, request_id));
        // create_dir_all이 아닌 create_dir: 이미 있으면 실패해야 함
        fs::create_dir(&request_dir).map_err(|e| ArchiveError::from_io(&request_dir, e))?;
        debug!(request_dir = %request_dir.display(), "staging root allocated");

        Ok(StagingRoot::new(request_id, request_dir, now))
    }

    /// 할당된 루트에 소스 복사
    pub fn populate(&self, root: &mut StagingRoot, sources: &[SourcePath]) -> Result<()> {
        if sources.is_empty() {
            return Err(ArchiveError::SourceNotProvided);
        }
        self.cancel.check()?;

        if let [single] = sources {
            if single.is_dir() {
                return self.populate_single_directory(root, single);
            }
        }
        self.populate_flat(root, sources)
    }

    /// 할당 + 복사
    ///
    /// 복사가 실패하면 방금 만든 디렉토리를 지우고 에러를 돌려줍니다.
    pub fn stage(&self, sources: &[SourcePath]) -> Result<StagingRoot> {
        if sources.is_empty() {
            return Err(ArchiveError::SourceNotProvided);
        }
        let mut root = self.allocate()?;
        if let Err(e) = self.populate(&mut root, sources) {
            if let Err(cleanup_err) = fs::remove_dir_all(root.request_dir()) {
                warn!(error = %cleanup_err, "failed to remove partial staging root");
            }
            return Err(e);
        }
        Ok(root)
    }

    fn populate_single_directory(
        &self,
        root: &mut StagingRoot,
        source: &SourcePath,
    ) -> Result<()> {
        let name = source_name(source)?;
        let dir = root.request_dir().join(&name);
        remove_existing(&dir)?;
        copy_directory(source.path(), &dir, self.cancel)?;

        root.set_staging_dir(dir, StagingLayout::SingleDirectory);
        root.record_entry(name);
        Ok(())
    }

    fn populate_flat(&self, root: &mut StagingRoot, sources: &[SourcePath]) -> Result<()> {
        let dir = root.request_dir().join(&self.config.archive_dir_name);
        remove_existing(&dir)?;
        fs::create_dir_all(&dir).map_err(|e| ArchiveError::from_io(&dir, e))?;
        root.set_staging_dir(dir.clone(), StagingLayout::Flat);

        for source in sources {
            self.cancel.check()?;
            let name = source_name(source)?;
            let dest_name = self.resolve_collision(root, &dir, name)?;
            let dest = dir.join(&dest_name);
            copy_path(source.path(), &dest, self.cancel)?;
            root.record_entry(dest_name);
        }
        Ok(())
    }

    /// 같은 이름이 이미 복사된 경우 정책에 따라 처리
    fn resolve_collision(
        &self,
        root: &StagingRoot,
        dir: &Path,
        name: OsString,
    ) -> Result<OsString> {
        if !root.contains_entry(&name) {
            return Ok(name);
        }
        match self.config.collision_policy {
            CollisionPolicy::Overwrite => {
                warn!(name = ?name, "duplicate source name, later source replaces earlier one");
                remove_existing(&dir.join(&name))?;
                Ok(name)
            }
            CollisionPolicy::Reject => Err(ArchiveError::Io {
                path: dir.join(&name),
                source: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("duplicate source name: {}", name.to_string_lossy()),
                ),
            }),
            CollisionPolicy::Rename => {
                let renamed = next_unique_name(root.entries(), &name);
                debug!(from = ?name, to = ?renamed, "duplicate source name renamed");
                Ok(renamed)
            }
        }
    }
}

/// 소스의 마지막 경로 요소 (디스크 이름 그대로)
fn source_name(source: &SourcePath) -> Result<OsString> {
    source
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| ArchiveError::Io {
            path: source.path().to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"),
        })
}

/// 기존 파일/디렉토리 삭제 (없으면 무시)
fn remove_existing(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(ArchiveError::from_io(path, e)),
    };
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| ArchiveError::from_io(path, e))
}

/// 선택된 소스 복사
///
/// 사용자가 고른 경로 자체는 링크를 따라가고, 그 아래 트리는 링크를 링크로 복사합니다.
fn copy_path(src: &Path, dest: &Path, cancel: &CancelFlag) -> Result<u64> {
    let meta = fs::metadata(src).map_err(|e| ArchiveError::from_io(src, e))?;
    if meta.is_dir() {
        copy_directory(src, dest, cancel)
    } else if meta.is_file() {
        copy_file(src, dest)
    } else {
        Err(unsupported_file_type(src))
    }
}

fn copy_file(src: &Path, dest: &Path) -> Result<u64> {
    fs::copy(src, dest).map_err(|e| ArchiveError::from_io(src, e))
}

/// 심볼릭 링크를 대상 경로 그대로 다시 만듦
#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> Result<u64> {
    let target = fs::read_link(src).map_err(|e| ArchiveError::from_io(src, e))?;
    std::os::unix::fs::symlink(&target, dest).map_err(|e| ArchiveError::from_io(dest, e))?;
    Ok(0)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, _dest: &Path) -> Result<u64> {
    Err(unsupported_file_type(src))
}

/// FIFO, 소켓, 장치 파일 등은 복사하지 않음 (`fs::copy`가 멈출 수 있음)
fn unsupported_file_type(path: &Path) -> ArchiveError {
    ArchiveError::Io {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "unsupported file type"),
    }
}

/// 디렉토리 재귀 복사 (링크는 따라가지 않음)
///
/// 반환값: 복사된 총 바이트 수
fn copy_directory(src: &Path, dest: &Path, cancel: &CancelFlag) -> Result<u64> {
    fs::create_dir_all(dest).map_err(|e| ArchiveError::from_io(dest, e))?;

    let mut total_bytes = 0u64;
    for entry in fs::read_dir(src).map_err(|e| ArchiveError::from_io(src, e))? {
        cancel.check()?;
        let entry = entry.map_err(|e| ArchiveError::from_io(src, e))?;
        let entry_path = entry.path();
        let dest_path = dest.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| ArchiveError::from_io(&entry_path, e))?;

        total_bytes += if file_type.is_dir() {
            copy_directory(&entry_path, &dest_path, cancel)?
        } else if file_type.is_symlink() {
            copy_symlink(&entry_path, &dest_path)?
        } else if file_type.is_file() {
            copy_file(&entry_path, &dest_path)?
        } else {
            return Err(unsupported_file_type(&entry_path));
        };
    }
    Ok(total_bytes)
}
