//! 압축 요청 진입점
//!
//! 권한 획득 → 스테이징 → 아카이브 생성 → (항상) 정리 순서로 실행합니다.
//! 처음 발생한 에러가 요청의 결과이며, 정리 단계의 에러는 로그로만 남습니다.

use crate::models::{ArchiveBlob, CancelFlag, PipelineState, SourcePath, StagingRoot};
use crate::system::{
    AccessScope, ArchiveBuilder, CleanupCoordinator, FilesystemAccessScope, LocalReadCoordinator,
    ReadCoordinator, ResourceAccessGuard, StagingAssembler,
};
use crate::utils::config::ZipperConfig;
use crate::utils::error::{ArchiveError, Result};
use std::path::Path;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 상태 전이 기록 + 이벤트 전송
struct PipelineTracker<'a> {
    state: PipelineState,
    events: Option<&'a Sender<PipelineState>>,
}

impl<'a> PipelineTracker<'a> {
    fn new(events: Option<&'a Sender<PipelineState>>) -> Self {
        Self {
            state: PipelineState::Idle,
            events,
        }
    }

    fn enter(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!(from = self.state.name(), to = next.name(), "pipeline transition");
        self.state = next;
        if let Some(tx) = self.events {
            // 수신 측이 사라져도 파이프라인은 계속
            let _ = tx.send(next);
        }
    }
}

/// 압축 요청 오케스트레이터
#[derive(Clone)]
pub struct Zipper {
    config: ZipperConfig,
    access: Arc<dyn AccessScope>,
    coordinator: Arc<dyn ReadCoordinator>,
}

impl Zipper {
    pub fn new(config: ZipperConfig) -> Self {
        let coordinator = Arc::new(LocalReadCoordinator::new(config.lease_timeout()));
        Self {
            config,
            access: Arc::new(FilesystemAccessScope),
            coordinator,
        }
    }

    pub fn with_access_scope(mut self, access: Arc<dyn AccessScope>) -> Self {
        self.access = access;
        self
    }

    pub fn with_read_coordinator(mut self, coordinator: Arc<dyn ReadCoordinator>) -> Self {
        self.coordinator = coordinator;
        self
    }

    pub fn config(&self) -> &ZipperConfig {
        &self.config
    }

    /// 소스 경로 목록으로 zip 아카이브 생성
    pub fn create_archive<P: AsRef<Path>>(&self, sources: &[P]) -> Result<ArchiveBlob> {
        self.run(sources, &CancelFlag::new(), None)
    }

    /// 취소 플래그와 상태 이벤트 채널을 받는 전체 버전
    pub fn run<P: AsRef<Path>>(
        &self,
        sources: &[P],
        cancel: &CancelFlag,
        events: Option<&Sender<PipelineState>>,
    ) -> Result<ArchiveBlob> {
        let mut tracker = PipelineTracker::new(events);

        if sources.is_empty() {
            tracker.enter(PipelineState::Failed(
                ArchiveError::SourceNotProvided.kind(),
            ));
            return Err(ArchiveError::SourceNotProvided);
        }

        let sources: Vec<SourcePath> = sources
            .iter()
            .map(|p| SourcePath::resolve(p.as_ref()))
            .collect();
        info!(sources = sources.len(), "archive request started");

        tracker.enter(PipelineState::Acquiring);
        let guard = ResourceAccessGuard::new(self.access.as_ref());
        let mut handles = guard.acquire(&sources);

        let mut staging: Option<StagingRoot> = None;
        let outcome = self.stage_and_build(&sources, cancel, &mut staging, &mut tracker);

        tracker.enter(PipelineState::Cleaning);
        let report = CleanupCoordinator::new(&guard).cleanup(staging.take(), &mut handles);
        if !report.errors.is_empty() {
            warn!(errors = ?report.errors, "cleanup finished with errors");
        }

        match &outcome {
            Ok(blob) => {
                tracker.enter(PipelineState::Done);
                info!(bytes = blob.len(), "archive request finished");
            }
            Err(e) => {
                tracker.enter(PipelineState::Failed(e.kind()));
                warn!(error = %e, "archive request failed");
            }
        }
        outcome
    }

    fn stage_and_build(
        &self,
        sources: &[SourcePath],
        cancel: &CancelFlag,
        staging: &mut Option<StagingRoot>,
        tracker: &mut PipelineTracker<'_>,
    ) -> Result<ArchiveBlob> {
        cancel.check()?;
        tracker.enter(PipelineState::Staging);
        let assembler = StagingAssembler::new(&self.config, cancel);
        let root = staging.insert(assembler.allocate()?);
        assembler.populate(root, sources)?;

        cancel.check()?;
        tracker.enter(PipelineState::Building);
        ArchiveBuilder::new(self.coordinator.as_ref(), &self.config.default_filename).build(root)
    }
}

impl Default for Zipper {
    fn default() -> Self {
        Self::new(ZipperConfig::default())
    }
}

/// 기본 설정으로 아카이브 생성
pub fn create_archive<P: AsRef<Path>>(sources: &[P]) -> Result<ArchiveBlob> {
    Zipper::default().create_archive(sources)
}
