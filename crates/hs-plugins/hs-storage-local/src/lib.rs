//! # hs-storage-local
//!
//! Local filesystem implementation of `MediaStore`. Files are stored
//! content-addressed under a flat uploads directory: the SHA-256 of the
//! payload names the file, with the original extension kept so the static
//! file layer can serve a correct content type. Re-uploading identical
//! bytes is a no-op that returns the existing URI.

use async_trait::async_trait;
use bytes::Bytes;
use hs_core::traits::MediaStore;
use sha2::{Digest, Sha256};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub struct LocalMediaStore {
    /// Directory all uploads land in (e.g. "uploads").
    root: PathBuf,
    /// Public prefix the files are served under
    /// (e.g. "http://localhost:3001/uploads").
    url_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, url_prefix: impl Into<String>) -> Self {
        let url_prefix = url_prefix.into().trim_end_matches('/').to_owned();
        Self { root, url_prefix }
    }

    fn file_name(data: &[u8], original_name: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let hash = format!("{:x}", hasher.finalize());

        match Path::new(original_name)
            .extension()
            .and_then(OsStr::to_str)
        {
            Some(ext) => format!("{hash}.{}", ext.to_ascii_lowercase()),
            None => hash,
        }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn save_upload(&self, data: Bytes, original_name: &str) -> anyhow::Result<String> {
        let file_name = Self::file_name(&data, original_name);
        let target = self.root.join(&file_name);

        fs::create_dir_all(&self.root).await?;
        if !target.exists() {
            fs::write(&target, &data).await?;
            debug!(file = %file_name, bytes = data.len(), "stored upload");
        }

        Ok(format!("{}/{}", self.url_prefix, file_name))
    }
}
