//! Product image storage on the local filesystem.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bazaar_commerce::catalog::{has_image_extension, MAX_IMAGE_REF_LEN};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Upper bound on `_N` suffixes tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Errors from saving an uploaded image.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("File type not allowed: {0}")]
    NotAllowed(String),

    #[error("No free file name for {0}")]
    NameExhausted(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes images into a directory that is served under `url_prefix`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    url_prefix: String,
}

impl ImageStore {
    /// `url_prefix` is normalized to a single leading slash and no trailing
    /// one; an empty prefix falls back to `/images`.
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let url_prefix = url_prefix.into();
        let trimmed = url_prefix.trim_matches('/');
        let url_prefix = if trimmed.is_empty() {
            "/images".to_string()
        } else {
            format!("/{trimmed}")
        };
        Self {
            dir: dir.into(),
            url_prefix,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Create the directory if it is missing.
    pub async fn ensure_dir(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Save `bytes` under a sanitized version of `file_name` and return the
    /// public URL. Taken names get `_1`, `_2`, ... before the extension.
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let clean = sanitize_file_name(file_name);
        if !has_image_extension(&clean) {
            return Err(UploadError::NotAllowed(file_name.to_string()));
        }
        let (stem, ext) = clean
            .rsplit_once('.')
            .ok_or_else(|| UploadError::NotAllowed(file_name.to_string()))?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = if attempt == 0 {
                clean.clone()
            } else {
                format!("{stem}_{attempt}.{ext}")
            };

            let open = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(&candidate))
                .await;

            match open {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    tracing::info!(file = %candidate, size = bytes.len(), "image saved");
                    return Ok(format!("{}/{}", self.url_prefix, candidate));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(UploadError::NameExhausted(clean))
    }

    /// Delete an image previously returned by [`save`](Self::save).
    pub async fn remove(&self, url: &str) -> Result<(), UploadError> {
        let name = url
            .strip_prefix(&self.url_prefix)
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or(url);
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return Ok(());
        }
        tokio::fs::remove_file(self.dir.join(name)).await?;
        Ok(())
    }
}

/// Reduce a client-supplied file name to a safe single path component.
///
/// Directory parts are dropped, characters outside `[A-Za-z0-9._-]` become
/// `_`, leading dots are stripped and the stem is shortened so the public
/// URL stays within the stored image reference limit.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    // Room for the URL prefix and a `_NNN` suffix.
    let max_len = MAX_IMAGE_REF_LEN.saturating_sub(40);
    match cleaned.rsplit_once('.') {
        Some((stem, ext)) if cleaned.len() > max_len => {
            let keep = max_len.saturating_sub(ext.len() + 1).max(1);
            let stem: String = stem.chars().take(keep).collect();
            format!("{stem}.{ext}")
        }
        _ => cleaned.to_string(),
    }
}
