//! Files offered for upload
//!
//! A [`FileSource`] exposes the metadata the validator inspects (name, MIME
//! type, size) and an async full read for the encoder.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Bytes inspected when sniffing a file's type
const SNIFF_LEN: u64 = 64;

/// MIME type used when neither content nor extension identify the file
pub const UNKNOWN_MIME: &str = "application/octet-stream";

/// A file selected or dropped for upload
#[async_trait]
pub trait FileSource: Send + Sync {
    /// File name as shown to the user and sent to the backend
    fn name(&self) -> &str;

    /// MIME type, e.g. `image/png`
    fn mime_type(&self) -> &str;

    /// Size in bytes
    fn size(&self) -> u64;

    /// Read the full contents
    async fn read_all(&self) -> io::Result<Vec<u8>>;
}

/// A file on the local filesystem
///
/// Metadata is captured when the file is opened; contents are read lazily.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
    mime_type: String,
    size: u64,
}

impl LocalFile {
    /// Open a file and capture its metadata
    ///
    /// The MIME type is sniffed from the leading bytes, falling back to the
    /// file extension.
    pub async fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let mut head = Vec::with_capacity(SNIFF_LEN as usize);
        tokio::fs::File::open(&path)
            .await?
            .take(SNIFF_LEN)
            .read_to_end(&mut head)
            .await?;

        let mime_type = infer::get(&head)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| mime_from_extension(&path).to_string());

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        tracing::debug!(path = %path.display(), mime = %mime_type, size = metadata.len(), "Opened upload file");

        Ok(Self {
            path,
            name,
            mime_type,
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FileSource for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size(&self) -> u64 {
        self.size
    }

    async fn read_all(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

/// A file held in memory
#[derive(Debug, Clone)]
pub struct InMemoryFile {
    name: String,
    mime_type: String,
    data: Vec<u8>,
}

impl InMemoryFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }
}

#[async_trait]
impl FileSource for InMemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    async fn read_all(&self) -> io::Result<Vec<u8>> {
        Ok(self.data.clone())
    }
}

/// MIME type implied by a file extension
pub fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => UNKNOWN_MIME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension(Path::new("a/B.JPG")), "image/jpeg");
        assert_eq!(mime_from_extension(Path::new("c.webp")), "image/webp");
        assert_eq!(mime_from_extension(Path::new("d.gif")), "image/gif");
        assert_eq!(mime_from_extension(Path::new("noext")), UNKNOWN_MIME);
    }

    #[tokio::test]
    async fn test_local_file_sniffs_content() {
        let dir = TempDir::new().unwrap();
        // Content says PNG, extension says nothing useful
        let path = dir.path().join("upload.bin");
        std::fs::write(&path, PNG_HEADER).unwrap();

        let file = LocalFile::open(&path).await.unwrap();
        assert_eq!(file.name(), "upload.bin");
        assert_eq!(file.mime_type(), "image/png");
        assert_eq!(file.size(), PNG_HEADER.len() as u64);
        assert_eq!(file.read_all().await.unwrap(), PNG_HEADER);
    }

    #[tokio::test]
    async fn test_local_file_falls_back_to_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.jpeg");
        std::fs::write(&path, b"not really a jpeg").unwrap();

        let file = LocalFile::open(&path).await.unwrap();
        assert_eq!(file.mime_type(), "image/jpeg");
    }

    #[tokio::test]
    async fn test_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = LocalFile::open(dir.path()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_in_memory_file() {
        let file = InMemoryFile::new("a.png", "image/png", vec![1, 2, 3]);
        assert_eq!(file.size(), 3);
        assert_eq!(file.read_all().await.unwrap(), vec![1, 2, 3]);
    }
}
