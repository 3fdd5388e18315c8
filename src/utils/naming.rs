use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// `stem_(n).ext` 형식의 후보 이름 생성 (n = 0이면 원래 이름)
///
/// UTF-8이 아닌 이름도 바이트를 그대로 유지합니다.
fn numbered_name(desired: &OsStr, index: usize) -> OsString {
    if index == 0 {
        return desired.to_os_string();
    }
    let desired_path = Path::new(desired);
    let stem = desired_path
        .file_stem()
        .filter(|s| !s.is_empty())
        .unwrap_or(desired);
    let mut name = stem.to_os_string();
    name.push(format!("_({})", index));
    if let Some(ext) = desired_path.extension().filter(|e| !e.is_empty()) {
        name.push(".");
        name.push(ext);
    }
    name
}

/// 디렉토리 안에서 아직 존재하지 않는 경로 반환
pub fn next_unique_path(base_dir: &Path, desired_filename: &str) -> PathBuf {
    let mut index = 0usize;
    loop {
        let candidate = base_dir.join(numbered_name(OsStr::new(desired_filename), index));
        if !candidate.exists() {
            return candidate;
        }
        index += 1;
    }
}

/// 이미 사용된 이름 목록을 피해 새 이름 반환
pub fn next_unique_name(taken: &BTreeSet<OsString>, desired: &OsStr) -> OsString {
    let mut index = 0usize;
    loop {
        let candidate = numbered_name(desired, index);
        if !taken.contains(&candidate) {
            return candidate;
        }
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_numbered_name() {
        assert_eq!(numbered_name(OsStr::new("report.txt"), 0), "report.txt");
        assert_eq!(numbered_name(OsStr::new("report.txt"), 2), "report_(2).txt");
        assert_eq!(numbered_name(OsStr::new("photos"), 1), "photos_(1)");
        assert_eq!(numbered_name(OsStr::new(".profile"), 1), ".profile_(1)");
    }

    #[test]
    fn test_next_unique_path_skips_existing() {
        let temp = tempdir().expect("create tempdir");
        fs::write(temp.path().join("archive.zip"), b"x").expect("write existing");
        fs::write(temp.path().join("archive_(1).zip"), b"x").expect("write existing");

        assert_eq!(
            next_unique_path(temp.path(), "archive.zip"),
            temp.path().join("archive_(2).zip")
        );
    }

    #[test]
    fn test_next_unique_name() {
        let taken: BTreeSet<OsString> = [OsString::from("a.txt"), OsString::from("a_(1).txt")]
            .into_iter()
            .collect();
        assert_eq!(next_unique_name(&taken, OsStr::new("a.txt")), "a_(2).txt");
        assert_eq!(next_unique_name(&taken, OsStr::new("b.txt")), "b.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_numbered_name_keeps_non_utf8_bytes() {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let desired = OsStr::from_bytes(b"caf\xe9.txt");
        let renamed = numbered_name(desired, 1);
        assert_eq!(renamed.into_vec(), b"caf\xe9_(1).txt".to_vec());
    }
}
