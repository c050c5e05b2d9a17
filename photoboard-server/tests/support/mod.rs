#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result, anyhow};
use axum::Router;
use axum_test::TestServer;
use photoboard_server::{
    AppState,
    infra::{
        config::Config,
        startup::{NoopStartupHooks, StartupHooks},
    },
    routes::create_router,
};
use tempfile::TempDir;

pub const STYLESHEET: &str = "body { font-family: sans-serif; }\n";

#[derive(Debug)]
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _tempdir: TempDir,
}

impl TestApp {
    pub fn into_parts(self) -> (Router, AppState, TempDir) {
        (self.router, self.state, self._tempdir)
    }

    pub fn server(&self) -> Result<TestServer> {
        TestServer::new(self.router.clone()).map_err(|err| anyhow!(err.to_string()))
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.state.config().storage.upload_dir.clone()
    }

    pub fn data_file(&self) -> PathBuf {
        self.state.config().storage.data_file.clone()
    }
}

pub async fn build_test_app() -> Result<TestApp> {
    build_test_app_with(|_| {}, &NoopStartupHooks).await
}

/// Builds the app under a fresh tempdir. `customize` runs on the rooted
/// config before bootstrap.
pub async fn build_test_app_with<F, H>(customize: F, hooks: &H) -> Result<TestApp>
where
    F: FnOnce(&mut Config),
    H: StartupHooks,
{
    let tempdir = tempfile::tempdir().context("failed to create tempdir")?;

    let mut config = Config::rooted_at(tempdir.path());
    config.maintenance.startup_sweep = None;
    customize(&mut config);

    let styles_dir = config.storage.public_dir.join("styles");
    std::fs::create_dir_all(&styles_dir)?;
    std::fs::write(styles_dir.join("styles.css"), STYLESHEET)?;

    let state = AppState::bootstrap(Arc::new(config)).await?;
    hooks.run(&state).await?;

    let router = create_router(state.clone());

    Ok(TestApp {
        router,
        state,
        _tempdir: tempdir,
    })
}
