use crate::models::StagingRoot;
use crate::system::access::{AccessHandle, ResourceAccessGuard};
use std::fs;
use std::io;
use tracing::{debug, warn};

/// 정리 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub staging_removed: bool,
    pub handles_released: usize,
    pub errors: Vec<String>,
}

/// 요청 종료 시 임시 파일과 접근 권한 정리
///
/// 정리 중 에러는 로그와 보고서에만 남기고, 요청의 결과를 바꾸지 않습니다.
pub struct CleanupCoordinator<'g, 'a> {
    guard: &'g ResourceAccessGuard<'a>,
}

impl<'g, 'a> CleanupCoordinator<'g, 'a> {
    pub fn new(guard: &'g ResourceAccessGuard<'a>) -> Self {
        Self { guard }
    }

    pub fn cleanup(
        &self,
        root: Option<StagingRoot>,
        handles: &mut [AccessHandle],
    ) -> CleanupReport {
        let mut report = CleanupReport::default();

        if let Some(root) = root {
            match fs::remove_dir_all(root.request_dir()) {
                Ok(()) => {
                    debug!(request = root.request_id(), "staging root removed");
                    report.staging_removed = true;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(request = root.request_id(), "staging root already gone");
                }
                Err(e) => {
                    warn!(
                        path = %root.request_dir().display(),
                        error = %e,
                        "error removing temp files"
                    );
                    report
                        .errors
                        .push(format!("{}: {}", root.request_dir().display(), e));
                }
            }
        }

        report.handles_released = self.guard.release(handles);
        report
    }
}
