/// Blob storage for uploaded file bytes
///
/// The catalog persists file contents through the [`BlobStore`] trait and
/// file metadata through the record store. Blobs are addressed by a key of
/// the form `{owner_id}/{unique}-{sanitized_name}` built by
/// [`UploadPolicy::blob_path`]; keys never contain a user-controlled
/// directory component.
///
/// # Implementations
///
/// - [`LocalBlobStore`]: files under a root directory (tokio::fs)
/// - [`MemoryBlobStore`]: in-process map, with failure injection for tests
///
/// # Example
///
/// ```no_run
/// use bytes::Bytes;
/// use groupshare_shared::storage::{BlobStore, LocalBlobStore, UploadPolicy};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = LocalBlobStore::new("./files");
/// let policy = UploadPolicy::default();
///
/// let name = policy.check_name("quarterly report.pdf")?;
/// let path = policy.blob_path(Uuid::new_v4(), &name);
///
/// store.put(&path, Bytes::from_static(b"%PDF-1.7")).await?;
/// assert!(store.delete(&path).await?);
/// # Ok(())
/// # }
/// ```

pub mod local;
pub mod memory;
pub mod policy;

use async_trait::async_trait;
use bytes::Bytes;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
pub use policy::{sanitize_filename, UploadPolicy, MAX_FILE_NAME_BYTES};

/// Errors raised by blob stores and upload validation
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid blob path: {0}")]
    InvalidPath(String),

    #[error("File name is empty after sanitizing")]
    EmptyName,

    #[error("File name is {len} bytes; the limit is {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("File extension '{0}' is not allowed")]
    DisallowedExtension(String),

    #[error("Upload of {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: usize, max: usize },

    #[error("Blob I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Blob store failure: {0}")]
    Backend(String),
}

impl BlobError {
    /// Whether the error is caused by the upload itself rather than the store
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BlobError::EmptyName
                | BlobError::NameTooLong { .. }
                | BlobError::DisallowedExtension(_)
                | BlobError::TooLarge { .. }
        )
    }
}

pub type BlobResult<T> = Result<T, BlobError>;

/// Byte storage addressed by namespaced path
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Writes `bytes` at `path`, replacing anything already there
    async fn put(&self, path: &str, bytes: Bytes) -> BlobResult<()>;

    /// Reads the blob at `path`
    ///
    /// # Errors
    ///
    /// `BlobError::NotFound` if nothing is stored at `path`.
    async fn get(&self, path: &str) -> BlobResult<Bytes>;

    /// Removes the blob at `path`
    ///
    /// Returns true if it existed. Missing blobs are not an error.
    async fn delete(&self, path: &str) -> BlobResult<bool>;
}

/// Rejects keys that could escape the store root
///
/// A valid key is a relative `/`-separated path whose segments are all
/// non-empty and none of which is `.` or `..`.
pub fn validate_key(path: &str) -> BlobResult<()> {
    if path.is_empty() || path.starts_with('/') || path.contains('\\') || path.contains('\0') {
        return Err(BlobError::InvalidPath(path.to_string()));
    }

    if path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(BlobError::InvalidPath(path.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("a1b2/123-report.pdf").is_ok());
        assert!(validate_key("report.pdf").is_ok());

        for bad in ["", "/etc/passwd", "a/../b", "a//b", "./a", "a\\b", "a/"] {
            assert!(
                matches!(validate_key(bad), Err(BlobError::InvalidPath(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_client_errors() {
        assert!(BlobError::EmptyName.is_client_error());
        assert!(BlobError::TooLarge { size: 2, max: 1 }.is_client_error());
        assert!(!BlobError::NotFound("x".into()).is_client_error());
        assert!(!BlobError::Backend("down".into()).is_client_error());
    }
}
