use crate::models::{ArchiveBlob, StagingRoot};
use crate::system::coordination::{coordinate_read, ReadCoordinator};
use crate::utils::error::{ArchiveError, Result};
use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use zip::result::ZipError;
use zip::write::SimpleFileOptions as ZipFileOptions;
use zip::{CompressionMethod, DateTime as ZipDateTime, ZipWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ArchiveItemKind {
    File,
    Directory,
    /// 링크 대상 경로 (따라가지 않음)
    Symlink(PathBuf),
}

/// 아카이브에 들어갈 항목
#[derive(Debug, Clone)]
struct ArchiveSourceItem {
    source_path: PathBuf,
    archive_path: PathBuf,
    kind: ArchiveItemKind,
}

/// 스테이징 트리를 zip 바이트로 직렬화
pub struct ArchiveBuilder<'a> {
    coordinator: &'a dyn ReadCoordinator,
    suggested_filename: &'a str,
}

impl<'a> ArchiveBuilder<'a> {
    pub fn new(coordinator: &'a dyn ReadCoordinator, suggested_filename: &'a str) -> Self {
        Self {
            coordinator,
            suggested_filename,
        }
    }

    /// 채워진 스테이징 루트로 아카이브 생성
    ///
    /// 엔트리 이름은 `archive_base` 기준 상대 경로입니다.
    pub fn build(&self, root: &StagingRoot) -> Result<ArchiveBlob> {
        if root.staging_dir().is_none() {
            return Err(ArchiveError::CreationFailed {
                reason: "staging root was never populated".to_string(),
            });
        }

        let bytes = coordinate_read(self.coordinator, root.archive_base(), |base| {
            let items = collect_items(base)?;
            write_zip(&items)
        })?;

        if bytes.is_empty() {
            return Err(ArchiveError::CreationFailed {
                reason: "archive serialization produced no bytes".to_string(),
            });
        }
        info!(
            request = root.request_id(),
            bytes = bytes.len(),
            "archive created"
        );
        Ok(ArchiveBlob::new(bytes, self.suggested_filename))
    }
}

/// 트리를 순회하며 항목 수집 (이름 순 정렬)
///
/// 디렉토리 엔트리는 비어 있는 디렉토리에만 기록합니다.
fn collect_items(base: &Path) -> Result<Vec<ArchiveSourceItem>> {
    let mut items = Vec::new();
    collect_items_recursive(base, Path::new(""), &mut items)?;
    items.sort_by(|a, b| a.archive_path.cmp(&b.archive_path));
    Ok(items)
}

fn collect_items_recursive(
    source_path: &Path,
    archive_path: &Path,
    out: &mut Vec<ArchiveSourceItem>,
) -> Result<()> {
    let mut children = Vec::new();
    for entry in fs::read_dir(source_path).map_err(|e| ArchiveError::from_io(source_path, e))? {
        let entry = entry.map_err(|e| ArchiveError::from_io(source_path, e))?;
        children.push(entry);
    }

    let is_root = archive_path.as_os_str().is_empty();
    if children.is_empty() && !is_root {
        out.push(ArchiveSourceItem {
            source_path: source_path.to_path_buf(),
            archive_path: archive_path.to_path_buf(),
            kind: ArchiveItemKind::Directory,
        });
        return Ok(());
    }

    for entry in children {
        let child_source = entry.path();
        let child_archive = archive_path.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| ArchiveError::from_io(&child_source, e))?;
        let kind = if file_type.is_dir() {
            collect_items_recursive(&child_source, &child_archive, out)?;
            continue;
        } else if file_type.is_symlink() {
            let target =
                fs::read_link(&child_source).map_err(|e| ArchiveError::from_io(&child_source, e))?;
            ArchiveItemKind::Symlink(target)
        } else if file_type.is_file() {
            ArchiveItemKind::File
        } else {
            return Err(ArchiveError::Io {
                path: child_source,
                source: io::Error::new(io::ErrorKind::InvalidInput, "unsupported file type"),
            });
        };
        out.push(ArchiveSourceItem {
            source_path: child_source,
            archive_path: child_archive,
            kind,
        });
    }
    Ok(())
}

fn archive_display_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(v) => Some(v.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn map_zip_error(error: ZipError) -> ArchiveError {
    match error {
        ZipError::Io(e) => ArchiveError::Io {
            path: PathBuf::from("<archive>"),
            source: e,
        },
        other => ArchiveError::CreationFailed {
            reason: other.to_string(),
        },
    }
}

/// 항목들을 메모리 버퍼에 zip으로 기록
///
/// 수정 시각과 권한을 고정해 같은 입력이면 같은 바이트가 나오도록 합니다.
fn write_zip(items: &[ArchiveSourceItem]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let file_options = ZipFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(ZipDateTime::default())
        .unix_permissions(0o644);
    let dir_options = file_options.unix_permissions(0o755);
    let link_options = file_options.unix_permissions(0o777);

    for item in items {
        let mut name = archive_display_path(&item.archive_path);
        match &item.kind {
            ArchiveItemKind::Directory => {
                name.push('/');
                writer
                    .add_directory(name, dir_options)
                    .map_err(map_zip_error)?;
                continue;
            }
            ArchiveItemKind::Symlink(target) => {
                let target = target.to_string_lossy().into_owned();
                debug!(entry = %name, target = %target, "symlink entry written");
                writer
                    .add_symlink(name, target, link_options)
                    .map_err(map_zip_error)?;
                continue;
            }
            ArchiveItemKind::File => {}
        }

        writer
            .start_file(name.clone(), file_options)
            .map_err(map_zip_error)?;
        let mut src =
            File::open(&item.source_path).map_err(|e| ArchiveError::from_io(&item.source_path, e))?;
        let copied = io::copy(&mut src, &mut writer)
            .map_err(|e| ArchiveError::from_io(&item.source_path, e))?;
        debug!(entry = %name, bytes = copied, "entry written");
    }

    let cursor = writer.finish().map_err(map_zip_error)?;
    Ok(cursor.into_inner())
}
