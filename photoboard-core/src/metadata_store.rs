use std::path::{Path, PathBuf};

use tokio::{io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::{PhotoError, Result},
    photo::{PhotoCollection, PhotoRecord},
};

/// Owner of the photo collection and its JSON snapshot file.
///
/// Every mutation builds the next collection, writes the whole snapshot,
/// and only then swaps it in, all while holding one lock. The in-memory
/// collection therefore always equals the last snapshot that reached disk,
/// and concurrent mutations cannot drop each other's changes.
#[derive(Debug)]
pub struct MetadataStore {
    path: PathBuf,
    collection: Mutex<PhotoCollection>,
}

impl MetadataStore {
    /// Load the snapshot at `path`, creating an empty one if none exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let collection = match tokio::fs::read(&path).await {
            Ok(bytes) => PhotoCollection::from_snapshot(&bytes).map_err(|source| {
                PhotoError::StoreCorrupt {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let empty = PhotoCollection::new();
                write_snapshot(&path, &empty).await?;
                info!(path = %path.display(), "created empty photo snapshot");
                empty
            }
            Err(source) => {
                return Err(PhotoError::StoreRead { path, source });
            }
        };

        debug!(path = %path.display(), photos = collection.len(), "photo snapshot loaded");

        Ok(Self {
            path,
            collection: Mutex::new(collection),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current records, oldest first.
    pub async fn list(&self) -> Vec<PhotoRecord> {
        self.collection.lock().await.records().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.collection.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.collection.lock().await.is_empty()
    }

    pub async fn get(&self, filename: &str) -> Option<PhotoRecord> {
        self.collection.lock().await.get(filename).cloned()
    }

    pub async fn append(&self, record: PhotoRecord) -> Result<()> {
        let mut current = self.collection.lock().await;
        if current.contains(&record.filename) {
            return Err(PhotoError::Duplicate(record.filename));
        }

        let mut next = current.clone();
        next.push(record);
        write_snapshot(&self.path, &next).await?;
        *current = next;
        Ok(())
    }

    /// Remove the record for `filename`. Unknown filenames are an error and
    /// leave the snapshot untouched.
    pub async fn remove(&self, filename: &str) -> Result<PhotoRecord> {
        let mut current = self.collection.lock().await;

        let mut next = current.clone();
        let removed = next
            .remove(filename)
            .ok_or_else(|| PhotoError::NotFound(filename.to_string()))?;
        write_snapshot(&self.path, &next).await?;
        *current = next;
        Ok(removed)
    }
}

/// Replace the snapshot at `path` with `collection` via temp file + rename.
async fn write_snapshot(path: &Path, collection: &PhotoCollection) -> Result<()> {
    let bytes = collection.to_snapshot()?;
    let store_write = |source| PhotoError::StoreWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(store_write)?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".to_string());
    let tmp = path.with_file_name(format!(".{file_name}.tmp-{}", Uuid::new_v4().simple()));

    let written = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(err) = written {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(store_write(err));
    }

    Ok(())
}
