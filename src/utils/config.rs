use crate::utils::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 설정 파일 경로를 지정하는 환경 변수
pub const CONFIG_ENV_VAR: &str = "ITSUKI_ZIPPER_CONFIG";

/// 같은 이름의 소스가 여러 개일 때 처리 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// 나중에 복사된 소스가 이전 것을 대체
    #[default]
    Overwrite,
    /// 충돌 시 요청 실패
    Reject,
    /// `name_(1).ext` 형식으로 이름 변경
    Rename,
}

/// 압축기 설정
///
/// TOML 파일에서 로드하며, 누락된 항목은 기본값을 사용합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZipperConfig {
    /// 스테이징 디렉토리를 만들 임시 영역 (없으면 OS 임시 디렉토리)
    pub temp_dir: Option<PathBuf>,
    pub staging_prefix: String,
    pub archive_dir_name: String,
    pub default_filename: String,
    pub collision_policy: CollisionPolicy,
    pub lease_timeout_ms: u64,
}

impl Default for ZipperConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            staging_prefix: "itsuki-zipper".to_string(),
            archive_dir_name: "archive".to_string(),
            default_filename: "archive.zip".to_string(),
            collision_policy: CollisionPolicy::default(),
            lease_timeout_ms: 30_000,
        }
    }
}

impl ZipperConfig {
    /// 스테이징 디렉토리의 상위 임시 영역
    pub fn temp_root(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(env::temp_dir)
    }

    pub fn lease_timeout(&self) -> Duration {
        Duration::from_millis(self.lease_timeout_ms)
    }

    /// TOML 파일에서 설정 로드
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ZipperConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 위치에서 설정 로드
    ///
    /// `ITSUKI_ZIPPER_CONFIG` → `<config_dir>/itsuki-zipper/config.toml` 순서로 찾고,
    /// 파일이 없으면 기본값을 반환합니다.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::config_path())
    }

    pub fn load_from(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        match Self::from_file(&path) {
            Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(custom) = env::var(CONFIG_ENV_VAR) {
            let trimmed = custom.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        dirs::config_dir().map(|dir| dir.join("itsuki-zipper").join("config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("staging_prefix", &self.staging_prefix),
            ("archive_dir_name", &self.archive_dir_name),
            ("default_filename", &self.default_filename),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
            }
            if value.contains('/') || value.contains('\\') {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a single path component",
                    field
                )));
            }
        }
        Ok(())
    }
}
