//! 조율된 읽기 (coordinated read)
//!
//! 스테이징 트리를 읽기 전에 임대(lease)를 얻고, 읽기가 끝나면 성공/실패와
//! 관계없이 반환합니다. 같은 경로를 감시하거나 읽는 다른 작업과 협력하기 위한
//! 임계 구역입니다.

use crate::utils::error::{ArchiveError, Result};
use parking_lot::{Condvar, Mutex};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// 읽기 임대
#[derive(Debug)]
pub struct ReadLease {
    id: u64,
    path: PathBuf,
}

impl ReadLease {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// 읽기 조율자
pub trait ReadCoordinator: Send + Sync {
    fn begin_read(&self, path: &Path) -> Result<ReadLease>;
    fn end_read(&self, lease: ReadLease);
}

/// 임대를 쥔 상태에서 `read` 실행
///
/// `read`가 에러를 반환하거나 패닉이 나도 임대는 반환됩니다.
pub fn coordinate_read<T, F>(coordinator: &dyn ReadCoordinator, path: &Path, read: F) -> Result<T>
where
    F: FnOnce(&Path) -> Result<T>,
{
    let lease = coordinator.begin_read(path)?;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| read(lease.path())));
    coordinator.end_read(lease);
    match outcome {
        Ok(result) => result,
        Err(payload) => panic::resume_unwind(payload),
    }
}

/// 프로세스 내부 임대 테이블
///
/// 경로별로 한 번에 하나의 읽기만 허용하며, 대기 시간이 제한을 넘으면 실패합니다.
pub struct LocalReadCoordinator {
    active: Mutex<HashSet<PathBuf>>,
    released: Condvar,
    next_id: AtomicU64,
    timeout: Duration,
}

impl LocalReadCoordinator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            active: Mutex::new(HashSet::new()),
            released: Condvar::new(),
            next_id: AtomicU64::new(1),
            timeout,
        }
    }

    pub fn active_leases(&self) -> usize {
        self.active.lock().len()
    }
}

impl ReadCoordinator for LocalReadCoordinator {
    fn begin_read(&self, path: &Path) -> Result<ReadLease> {
        let deadline = Instant::now() + self.timeout;
        let mut active = self.active.lock();
        while active.contains(path) {
            let timed_out = self.released.wait_until(&mut active, deadline).timed_out();
            if timed_out && active.contains(path) {
                return Err(ArchiveError::Unknown(format!(
                    "read coordination timed out after {:?} for {}",
                    self.timeout,
                    path.display()
                )));
            }
        }
        active.insert(path.to_path_buf());

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(lease = id, path = %path.display(), "read lease acquired");
        Ok(ReadLease {
            id,
            path: path.to_path_buf(),
        })
    }

    fn end_read(&self, lease: ReadLease) {
        self.active.lock().remove(&lease.path);
        self.released.notify_all();
        debug!(lease = lease.id, "read lease released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_lease_released_after_success_and_error() {
        let coordinator = LocalReadCoordinator::new(Duration::from_millis(100));
        let path = Path::new("/tmp/staging");

        let ok = coordinate_read(&coordinator, path, |p| Ok(p.to_path_buf()));
        assert_eq!(ok.expect("read ok"), PathBuf::from("/tmp/staging"));
        assert_eq!(coordinator.active_leases(), 0);

        let err: Result<()> = coordinate_read(&coordinator, path, |_| {
            Err(ArchiveError::CreationFailed {
                reason: "codec".to_string(),
            })
        });
        assert!(matches!(err, Err(ArchiveError::CreationFailed { .. })));
        assert_eq!(coordinator.active_leases(), 0);
    }

    #[test]
    fn test_lease_released_after_panic() {
        let coordinator = LocalReadCoordinator::new(Duration::from_millis(100));
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _: Result<()> =
                coordinate_read(&coordinator, Path::new("/tmp/p"), |_| panic!("reader blew up"));
        }));
        assert!(result.is_err());
        assert_eq!(coordinator.active_leases(), 0);
    }

    #[test]
    fn test_contended_lease_times_out() {
        let coordinator = LocalReadCoordinator::new(Duration::from_millis(20));
        let path = Path::new("/tmp/busy");
        let held = coordinator.begin_read(path).expect("first lease");

        let second = coordinator.begin_read(path);
        assert!(matches!(second, Err(ArchiveError::Unknown(ref m)) if m.contains("timed out")));

        coordinator.end_read(held);
        let third = coordinator.begin_read(path).expect("lease after release");
        coordinator.end_read(third);
    }

    #[test]
    fn test_waiter_proceeds_after_release() {
        let coordinator = Arc::new(LocalReadCoordinator::new(Duration::from_secs(5)));
        let path = PathBuf::from("/tmp/shared");
        let held = coordinator.begin_read(&path).expect("first lease");

        let waiter = {
            let coordinator = Arc::clone(&coordinator);
            let path = path.clone();
            thread::spawn(move || {
                let lease = coordinator.begin_read(&path).expect("second lease");
                coordinator.end_read(lease);
            })
        };

        thread::sleep(Duration::from_millis(20));
        coordinator.end_read(held);
        waiter.join().expect("waiter thread");
        assert_eq!(coordinator.active_leases(), 0);
    }

    #[test]
    fn test_distinct_paths_do_not_block() {
        let coordinator = LocalReadCoordinator::new(Duration::from_millis(10));
        let a = coordinator.begin_read(Path::new("/tmp/a")).expect("lease a");
        let b = coordinator.begin_read(Path::new("/tmp/b")).expect("lease b");
        assert_ne!(a.id(), b.id());
        coordinator.end_read(a);
        coordinator.end_read(b);
    }
}
