/// 완성된 zip 아카이브 (메모리 상의 바이트)
///
/// 반환된 뒤에는 호출자가 소유하며, 저장(내보내기)도 호출자가 담당합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveBlob {
    bytes: Vec<u8>,
    suggested_filename: String,
}

impl ArchiveBlob {
    pub fn new(bytes: Vec<u8>, suggested_filename: impl Into<String>) -> Self {
        Self {
            bytes,
            suggested_filename: suggested_filename.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn suggested_filename(&self) -> &str {
        &self.suggested_filename
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
