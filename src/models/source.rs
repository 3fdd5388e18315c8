//! 압축 대상 소스 모델
//!
//! 호출자(파일 선택기, 드래그 앤 드롭)가 넘겨준 경로를 요청 동안 빌려 씁니다.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// 소스 경로 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// 일반 파일 (심볼릭 링크 포함)
    File,
    /// 디렉토리
    Directory,
    /// 존재하지 않거나 메타데이터를 읽을 수 없음
    Missing,
}

/// 접근 범위 토큰
///
/// 플랫폼별 권한 부여 정보 (북마크 데이터 등). 내용은 해석하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeToken(Vec<u8>);

impl ScopeToken {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// 압축 소스 경로
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePath {
    path: PathBuf,
    kind: SourceKind,
    scope_token: Option<ScopeToken>,
}

impl SourcePath {
    /// 경로의 종류를 확인해 소스 생성
    pub fn resolve(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => SourceKind::Directory,
            Ok(_) => SourceKind::File,
            // 깨진 심볼릭 링크는 복사 단계에서 IO 에러로 드러남
            Err(_) if fs::symlink_metadata(&path).is_ok() => SourceKind::File,
            Err(_) => SourceKind::Missing,
        };
        Self {
            path,
            kind,
            scope_token: None,
        }
    }

    pub fn with_scope_token(mut self, token: ScopeToken) -> Self {
        self.scope_token = Some(token);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == SourceKind::Directory
    }

    pub fn scope_token(&self) -> Option<&ScopeToken> {
        self.scope_token.as_ref()
    }

    /// 마지막 경로 요소 (아카이브 안의 이름)
    pub fn file_name(&self) -> Option<&OsStr> {
        self.path.file_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_kinds() {
        let temp = tempdir().expect("create tempdir");
        let file = temp.path().join("a.txt");
        fs::write(&file, b"a").expect("write file");

        assert_eq!(SourcePath::resolve(&file).kind(), SourceKind::File);
        assert_eq!(SourcePath::resolve(temp.path()).kind(), SourceKind::Directory);
        assert_eq!(
            SourcePath::resolve(temp.path().join("missing")).kind(),
            SourceKind::Missing
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_broken_symlink_is_file() {
        let temp = tempdir().expect("create tempdir");
        let link = temp.path().join("dangling");
        std::os::unix::fs::symlink(temp.path().join("gone"), &link).expect("create symlink");
        assert_eq!(SourcePath::resolve(&link).kind(), SourceKind::File);
    }

    #[test]
    fn test_scope_token_and_file_name() {
        let source = SourcePath::resolve("/data/report.txt")
            .with_scope_token(ScopeToken::new(b"bm".to_vec()));
        assert_eq!(source.file_name(), Some(OsStr::new("report.txt")));
        assert_eq!(source.scope_token().map(ScopeToken::as_bytes), Some(&b"bm"[..]));
        assert!(SourcePath::resolve("/").file_name().is_none());
    }
}
