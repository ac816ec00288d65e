//! # ih-storage-local
//!
//! Local filesystem implementation of `BlobStore`.
//! Features: content-addressable storage, per-owner directories with hash
//! sharding, and image sniffing so only real images are accepted.

use std::path::PathBuf;

use async_trait::async_trait;
use ih_core::error::{AppError, Result};
use ih_core::traits::BlobStore;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info};

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const OWNER_DIR_CHARS: usize = 32;

pub struct LocalBlobStore {
    /// Root directory for all uploads (e.g., "./data/uploads")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/static/uploads")
    url_prefix: String,
    max_bytes: usize,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root_path: root,
            url_prefix,
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Generates a sharded reference: "ownerdir/ab/abcdef...hash.png"
    fn sharded_ref(owner_dir: &str, hash: &str, ext: &str) -> String {
        format!("{owner_dir}/{}/{hash}.{ext}", &hash[0..2])
    }

    /// Directory that holds one owner's uploads.
    ///
    /// User ids are opaque (they may contain `@`, `.` or `/`), so the
    /// directory is named by a digest of the id instead of the id itself.
    pub fn owner_dir(owner_id: &str) -> Result<String> {
        let owner_id = owner_id.trim();
        if owner_id.is_empty() {
            return Err(AppError::validation("image owner must not be empty"));
        }
        let digest = hex::encode(Sha256::digest(owner_id.as_bytes()));
        Ok(digest[..OWNER_DIR_CHARS].to_string())
    }
}

fn io_err(err: std::io::Error) -> AppError {
    AppError::StoreUnavailable(format!("blob store I/O: {err}"))
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    /// Saves an upload under its SHA-256 hash, so identical uploads from one
    /// owner are stored once.
    async fn put_image(&self, owner_id: &str, data: Vec<u8>, content_type: &str) -> Result<String> {
        let owner_dir = Self::owner_dir(owner_id)?;
        if data.is_empty() {
            return Err(AppError::validation("image upload is empty"));
        }
        if data.len() > self.max_bytes {
            return Err(AppError::validation(format!(
                "image exceeds {} bytes",
                self.max_bytes
            )));
        }
        if !content_type.is_empty()
            && !content_type.starts_with("image/")
            && content_type != "application/octet-stream"
        {
            return Err(AppError::validation(format!("unsupported content type {content_type}")));
        }

        let format = image::guess_format(&data)
            .map_err(|_| AppError::validation("upload is not a recognized image"))?;
        let ext = format.extensions_str().first().copied().unwrap_or("img");

        let hash = hex::encode(Sha256::digest(&data));
        let image_ref = Self::sharded_ref(&owner_dir, &hash, ext);
        let target_path = self.root_path.join(&image_ref);

        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        if fs::try_exists(&target_path).await.map_err(io_err)? {
            debug!(%image_ref, "image already stored");
        } else {
            fs::write(&target_path, &data).await.map_err(io_err)?;
            info!(%image_ref, bytes = data.len(), "image stored");
        }

        Ok(image_ref)
    }

    fn public_url(&self, image_ref: &str) -> String {
        format!("{}/{}", self.url_prefix.trim_end_matches('/'), image_ref)
    }
}
