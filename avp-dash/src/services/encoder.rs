//! Base64 encoding of upload payloads

use base64::{engine::general_purpose, Engine as _};

use super::file_source::FileSource;
use crate::error::EncodingError;

/// Standard-alphabet, padded base64 without any data-URI prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base64Payload(String);

impl Base64Payload {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(general_purpose::STANDARD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read a file fully and encode it
pub async fn encode<F: FileSource + ?Sized>(file: &F) -> Result<Base64Payload, EncodingError> {
    let bytes = file.read_all().await.map_err(|source| EncodingError::Read {
        name: file.name().to_string(),
        source,
    })?;

    let payload = Base64Payload::from_bytes(&bytes);
    tracing::debug!(file = %file.name(), bytes = bytes.len(), encoded = payload.len(), "Encoded upload payload");
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::file_source::{InMemoryFile, LocalFile};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_encode_has_no_data_uri_prefix() {
        let file = InMemoryFile::new("a.png", "image/png", b"\x89PNG".to_vec());
        let payload = encode(&file).await.unwrap();
        assert!(!payload.as_str().starts_with("data:"));
        assert_eq!(payload.as_str(), "iVBORw==");
    }

    #[tokio::test]
    async fn test_encode_is_padded_standard_alphabet() {
        let file = InMemoryFile::new("a.png", "image/png", vec![0xfb, 0xff]);
        let payload = encode(&file).await.unwrap();
        assert_eq!(payload.as_str(), "+/8=");
    }

    #[tokio::test]
    async fn test_encode_empty_file() {
        let file = InMemoryFile::new("a.png", "image/png", Vec::new());
        assert!(encode(&file).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.png");
        std::fs::write(&path, b"x").unwrap();
        let file = LocalFile::open(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        let err = encode(&file).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to read gone.png"));
    }
}
