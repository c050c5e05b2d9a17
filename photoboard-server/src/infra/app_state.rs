use std::{fmt, sync::Arc};

use anyhow::Context;
use photoboard_core::{BlobStore, MetadataStore, PhotoService};
use tracing::info;

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub photos: Arc<PhotoService>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(config: Arc<Config>, photos: Arc<PhotoService>) -> Self {
        Self { config, photos }
    }

    /// Create the storage directories and open both stores from `config`.
    pub async fn bootstrap(config: Arc<Config>) -> anyhow::Result<Self> {
        config
            .ensure_directories()
            .context("failed to prepare storage directories")?;

        let metadata = MetadataStore::open(&config.storage.data_file)
            .await
            .with_context(|| {
                format!(
                    "failed to open photo snapshot {}",
                    config.storage.data_file.display()
                )
            })?;
        let photos = PhotoService::new(
            BlobStore::new(config.storage.upload_dir.clone()),
            Arc::new(metadata),
        );

        info!(
            storage.upload_dir = %config.storage.upload_dir.display(),
            storage.data_file = %config.storage.data_file.display(),
            photos = photos.metadata().len().await,
            "photo storage ready"
        );

        Ok(Self::new(config, Arc::new(photos)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_handle(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    pub fn photos(&self) -> &PhotoService {
        &self.photos
    }
}
