use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::infra::app_state::AppState;

#[async_trait]
pub trait StartupHooks: Send + Sync {
    async fn run(&self, state: &AppState) -> Result<()>;
}

/// Runs the configured startup sweep before the listener opens, while no
/// upload can be in flight.
#[derive(Debug, Default)]
pub struct ProdStartupHooks;

#[async_trait]
impl StartupHooks for ProdStartupHooks {
    async fn run(&self, state: &AppState) -> Result<()> {
        let Some(mode) = state.config().maintenance.startup_sweep else {
            info!("startup sweep disabled");
            return Ok(());
        };

        match state.photos().sweep(mode).await {
            Ok(report) if !report.is_clean() => {
                warn!(
                    mode = %mode,
                    orphaned_blobs = ?report.orphaned_blobs,
                    dangling_records = ?report.dangling_records,
                    "photo storage is out of sync"
                );
            }
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "startup sweep failed");
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NoopStartupHooks;

#[async_trait]
impl StartupHooks for NoopStartupHooks {
    async fn run(&self, _state: &AppState) -> Result<()> {
        Ok(())
    }
}
