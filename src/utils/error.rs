use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 압축 요청 실패 종류
///
/// 호출자가 `match`로 분기할 수 있도록 에러 내용 없이 종류만 담습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveErrorKind {
    SourceNotProvided,
    AccessDenied,
    CreationFailed,
    IoFailure,
    Cancelled,
    Unknown,
}

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("No source provided")]
    SourceNotProvided,

    #[error("Access denied: {path}")]
    AccessDenied { path: PathBuf },

    #[error("Archive creation failed: {reason}")]
    CreationFailed { reason: String },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Archive request cancelled")]
    Cancelled,

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ArchiveError {
    /// io 에러를 경로와 함께 분류 (권한 문제는 AccessDenied)
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::PermissionDenied {
            ArchiveError::AccessDenied {
                path: path.to_path_buf(),
            }
        } else {
            ArchiveError::Io {
                path: path.to_path_buf(),
                source: error,
            }
        }
    }

    pub fn kind(&self) -> ArchiveErrorKind {
        match self {
            ArchiveError::SourceNotProvided => ArchiveErrorKind::SourceNotProvided,
            ArchiveError::AccessDenied { .. } => ArchiveErrorKind::AccessDenied,
            ArchiveError::CreationFailed { .. } => ArchiveErrorKind::CreationFailed,
            ArchiveError::Io { .. } => ArchiveErrorKind::IoFailure,
            ArchiveError::Cancelled => ArchiveErrorKind::Cancelled,
            ArchiveError::Unknown(_) => ArchiveErrorKind::Unknown,
        }
    }

    /// 사용자에게 보여줄 메시지
    pub fn message(&self) -> String {
        match self {
            ArchiveError::SourceNotProvided => "Specify file(s) to compress.".to_string(),
            ArchiveError::AccessDenied { .. } => {
                "Unable to access the specified files/folders.".to_string()
            }
            ArchiveError::CreationFailed { .. } => "Unable to create Zip".to_string(),
            ArchiveError::Io { path, source } => {
                format!("Failed to read or write {}: {}", path.display(), source)
            }
            ArchiveError::Cancelled => "Compression was cancelled.".to_string(),
            ArchiveError::Unknown(message) => format!("Failed with error {}", message),
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_classifies_permission_denied() {
        let err = ArchiveError::from_io(
            Path::new("/tmp/secret"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(
            err,
            ArchiveError::AccessDenied { ref path } if path == Path::new("/tmp/secret")
        ));
        assert_eq!(err.kind(), ArchiveErrorKind::AccessDenied);
    }

    #[test]
    fn test_from_io_keeps_other_errors_with_path() {
        let err = ArchiveError::from_io(
            Path::new("/tmp/missing"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        match err {
            ArchiveError::Io { path, source } => {
                assert_eq!(path, PathBuf::from("/tmp/missing"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ArchiveError::SourceNotProvided.message(),
            "Specify file(s) to compress."
        );
        assert_eq!(
            ArchiveError::CreationFailed {
                reason: "empty".to_string()
            }
            .message(),
            "Unable to create Zip"
        );
        assert_eq!(
            ArchiveError::Unknown("boom".to_string()).message(),
            "Failed with error boom"
        );
    }
}
