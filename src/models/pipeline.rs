//! 압축 요청 파이프라인 상태 모델

use crate::utils::error::{ArchiveError, ArchiveErrorKind, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 요청 단위 상태 머신
///
/// `Idle -> Acquiring -> Staging -> Building -> Cleaning -> {Done | Failed}`.
/// 어느 단계에서든 에러가 나면 `Cleaning`으로 넘어갑니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Acquiring,
    Staging,
    Building,
    Cleaning,
    Done,
    Failed(ArchiveErrorKind),
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Acquiring => "acquiring",
            PipelineState::Staging => "staging",
            PipelineState::Building => "building",
            PipelineState::Cleaning => "cleaning",
            PipelineState::Done => "done",
            PipelineState::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed(_))
    }

    /// 허용된 전이인지 확인
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            // 빈 입력은 자원 획득 전에 바로 실패
            (Idle, Acquiring) | (Idle, Failed(ArchiveErrorKind::SourceNotProvided)) => true,
            (Acquiring, Staging) | (Staging, Building) => true,
            (Acquiring | Staging | Building, Cleaning) => true,
            (Cleaning, Done) | (Cleaning, Failed(_)) => true,
            _ => false,
        }
    }
}

/// 작업 취소 플래그
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// 취소되었으면 `Cancelled` 에러
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ArchiveError::Cancelled)
        } else {
            Ok(())
        }
    }
}
