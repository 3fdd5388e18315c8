use crate::core::orchestrator::Zipper;
use crate::models::{ArchiveBlob, CancelFlag, PipelineState};
use crate::utils::error::{ArchiveError, Result};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// 백그라운드 압축 작업
///
/// 호출 측(UI 루프)은 `poll_events`로 상태를 받아 오고, 끝나면 `wait`로 결과를 가져갑니다.
pub struct ArchiveWorker {
    events_rx: Receiver<PipelineState>,
    cancel: CancelFlag,
    join_handle: Option<JoinHandle<Result<ArchiveBlob>>>,
    last_state: PipelineState,
}

/// 별도 스레드에서 압축 요청 실행
pub fn spawn_archive_worker(zipper: Arc<Zipper>, sources: Vec<PathBuf>) -> ArchiveWorker {
    let (events_tx, events_rx) = mpsc::channel();
    let cancel = CancelFlag::new();
    let cancel_for_worker = cancel.clone();
    let join_handle =
        thread::spawn(move || zipper.run(&sources, &cancel_for_worker, Some(&events_tx)));

    ArchiveWorker {
        events_rx,
        cancel,
        join_handle: Some(join_handle),
        last_state: PipelineState::Idle,
    }
}

impl ArchiveWorker {
    /// 취소 요청 (다음 단계 경계에서 반영)
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// 쌓인 상태 이벤트를 모두 꺼냄
    pub fn poll_events(&mut self) -> Vec<PipelineState> {
        let events: Vec<PipelineState> = self.events_rx.try_iter().collect();
        if let Some(last) = events.last() {
            self.last_state = *last;
        }
        events
    }

    pub fn last_state(&self) -> PipelineState {
        self.last_state
    }

    pub fn is_finished(&self) -> bool {
        self.join_handle
            .as_ref()
            .map_or(true, JoinHandle::is_finished)
    }

    /// 작업이 끝날 때까지 대기
    pub fn wait(mut self) -> Result<ArchiveBlob> {
        let Some(handle) = self.join_handle.take() else {
            return Err(ArchiveError::Unknown("archive worker already joined".to_string()));
        };
        handle
            .join()
            .map_err(|_| ArchiveError::Unknown("Archive worker thread panicked".to_string()))?
    }
}
