/// Upload validation and blob path construction

use uuid::Uuid;

use super::{BlobError, BlobResult};

/// Default allow-listed extensions
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["txt", "pdf", "jpg", "jpeg"];

/// Longest sanitized file name accepted, in bytes
///
/// Leaves room for the 33-byte unique prefix in [`UploadPolicy::blob_path`]
/// under the usual 255-byte filesystem limit, and fits `files.name`.
pub const MAX_FILE_NAME_BYTES: usize = 200;

/// Default upload size limit (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Reduces a client-supplied file name to a safe display name
///
/// Whitespace and path separators become `_`, characters outside
/// `[A-Za-z0-9._-]` are dropped, and leading dots and underscores are
/// stripped so the result can never be a hidden file or a relative path
/// component.
pub fn sanitize_filename(raw: &str) -> String {
    let mapped: String = raw
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() || c == '/' || c == '\\' => Some('_'),
            c if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' => Some(c),
            _ => None,
        })
        .collect();

    mapped
        .trim_start_matches(|c| c == '.' || c == '_')
        .trim_end_matches('_')
        .to_string()
}

/// Extension and size rules applied to every upload
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Lower-case extensions without the leading dot
    pub allowed_extensions: Vec<String>,
    pub max_bytes: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    pub fn new(allowed_extensions: Vec<String>, max_bytes: usize) -> Self {
        Self {
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            max_bytes,
        }
    }

    /// Sanitizes `raw` and checks its length and extension
    ///
    /// Returns the sanitized name.
    pub fn check_name(&self, raw: &str) -> BlobResult<String> {
        let name = sanitize_filename(raw);
        if name.is_empty() {
            return Err(BlobError::EmptyName);
        }
        if name.len() > MAX_FILE_NAME_BYTES {
            return Err(BlobError::NameTooLong {
                len: name.len(),
                max: MAX_FILE_NAME_BYTES,
            });
        }

        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if !self.allowed_extensions.iter().any(|allowed| *allowed == extension) {
            return Err(BlobError::DisallowedExtension(extension));
        }

        Ok(name)
    }

    pub fn check_size(&self, size: usize) -> BlobResult<()> {
        if size > self.max_bytes {
            return Err(BlobError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }

        Ok(())
    }

    /// Builds a collision-resistant key inside the owner's namespace
    ///
    /// `name` must already have passed [`check_name`](Self::check_name).
    pub fn blob_path(&self, owner_id: Uuid, name: &str) -> String {
        format!("{}/{}-{}", owner_id, Uuid::new_v4().simple(), name)
    }
}
