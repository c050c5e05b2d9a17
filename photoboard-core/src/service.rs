use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    blob_store::BlobStore,
    error::{PhotoError, Result},
    metadata_store::MetadataStore,
    photo::PhotoRecord,
    reconcile::{self, SweepMode, SweepReport},
};

/// Upload and delete sequences spanning the blob and metadata stores.
#[derive(Clone, Debug)]
pub struct PhotoService {
    blobs: BlobStore,
    metadata: Arc<MetadataStore>,
}

impl PhotoService {
    pub fn new(blobs: BlobStore, metadata: Arc<MetadataStore>) -> Self {
        Self { blobs, metadata }
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    pub fn metadata(&self) -> &Arc<MetadataStore> {
        &self.metadata
    }

    pub async fn list(&self) -> Vec<PhotoRecord> {
        self.metadata.list().await
    }

    /// Store `content` as a new blob and record it with `comment`.
    ///
    /// If the record cannot be persisted the new blob is removed again; a
    /// failure to remove it is logged and left for [`PhotoService::sweep`].
    pub async fn upload(
        &self,
        content: &[u8],
        original_name: Option<&str>,
        comment: &str,
    ) -> Result<PhotoRecord> {
        if content.is_empty() {
            return Err(PhotoError::Validation("photo is required".into()));
        }
        if comment.trim().is_empty() {
            return Err(PhotoError::Validation("comment is required".into()));
        }

        let extension = original_name.and_then(BlobStore::extension_of);
        let filename = self.blobs.save(content, extension.as_deref()).await?;
        let record = PhotoRecord::new(filename, comment);

        if let Err(err) = self.metadata.append(record.clone()).await {
            if let Err(cleanup) = self.blobs.delete(&record.filename).await {
                warn!(
                    filename = %record.filename,
                    error = %cleanup,
                    "failed to remove blob after metadata append failed; blob is orphaned"
                );
            }
            return Err(err);
        }

        info!(
            filename = %record.filename,
            bytes = content.len(),
            "photo uploaded"
        );
        Ok(record)
    }

    /// Forget the record for `filename` and remove its blob.
    ///
    /// Unknown filenames fail with [`PhotoError::NotFound`] before anything
    /// is touched. A blob that is already gone is not an error.
    pub async fn delete(&self, filename: &str) -> Result<PhotoRecord> {
        if !BlobStore::is_valid_name(filename) {
            return Err(PhotoError::InvalidName(filename.to_string()));
        }

        let record = self.metadata.remove(filename).await?;

        match self.blobs.delete(filename).await {
            Ok(()) => {}
            Err(PhotoError::BlobMissing(_)) => {
                warn!(filename, "photo record removed but its blob was already gone");
            }
            Err(err) => return Err(err),
        }

        info!(filename, "photo deleted");
        Ok(record)
    }

    pub async fn sweep(&self, mode: SweepMode) -> Result<SweepReport> {
        reconcile::sweep(&self.blobs, &self.metadata, mode).await
    }
}
