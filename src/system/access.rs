//! 소스 경로 접근 권한 관리
//!
//! 샌드박스 환경에서는 사용자가 고른 경로를 읽기 전에 범위 권한을 얻어야 합니다.
//! 권한 획득은 최선 노력(best-effort)이며 실패해도 요청을 중단하지 않습니다.
//! 실제로 권한이 부족하면 이후 복사 단계에서 IO 에러로 드러납니다.

use crate::models::SourcePath;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// 플랫폼별 범위 권한 획득/해제
pub trait AccessScope: Send + Sync {
    fn start_accessing(&self, source: &SourcePath) -> io::Result<()>;
    fn stop_accessing(&self, source: &SourcePath);
}

/// 별도 권한 모델이 없는 플랫폼용 구현
///
/// 획득 시 경로를 실제로 열 수 있는지만 확인합니다.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemAccessScope;

impl AccessScope for FilesystemAccessScope {
    fn start_accessing(&self, source: &SourcePath) -> io::Result<()> {
        let path = source.path();
        let meta = fs::metadata(path)?;
        if meta.is_dir() {
            fs::read_dir(path).map(|_| ())
        } else {
            File::open(path).map(|_| ())
        }
    }

    fn stop_accessing(&self, _source: &SourcePath) {}
}

/// 경로 하나에 대한 접근 핸들
#[derive(Debug)]
pub struct AccessHandle {
    source: SourcePath,
    granted: bool,
    released: bool,
}

impl AccessHandle {
    pub fn path(&self) -> &Path {
        self.source.path()
    }

    pub fn is_granted(&self) -> bool {
        self.granted
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

/// 접근 권한 가드
pub struct ResourceAccessGuard<'a> {
    scope: &'a dyn AccessScope,
}

impl<'a> ResourceAccessGuard<'a> {
    pub fn new(scope: &'a dyn AccessScope) -> Self {
        Self { scope }
    }

    /// 소스마다 독립적으로 권한 획득
    ///
    /// 실패한 경로도 핸들을 돌려주므로 `release`는 항상 전체 목록에 대해 호출합니다.
    pub fn acquire(&self, sources: &[SourcePath]) -> Vec<AccessHandle> {
        let handles: Vec<AccessHandle> = sources
            .iter()
            .map(|source| {
                let granted = match self.scope.start_accessing(source) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(
                            path = %source.path().display(),
                            error = %e,
                            "scoped access not granted"
                        );
                        false
                    }
                };
                AccessHandle {
                    source: source.clone(),
                    granted,
                    released: false,
                }
            })
            .collect();

        let denied = handles.iter().filter(|h| !h.granted).count();
        if denied > 0 {
            warn!(
                denied,
                total = handles.len(),
                "not able to access some sources, continuing anyway"
            );
        }
        handles
    }

    /// 권한 해제 (이미 해제된 핸들은 건너뜀)
    pub fn release(&self, handles: &mut [AccessHandle]) -> usize {
        let mut released = 0usize;
        for handle in handles.iter_mut().filter(|h| !h.released) {
            if handle.granted {
                self.scope.stop_accessing(&handle.source);
            }
            handle.released = true;
            released += 1;
        }
        debug!(released, "access handles released");
        released
    }
}
