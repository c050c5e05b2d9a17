use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub storage: FileStorageConfig,
    #[serde(default)]
    pub upload: FileUploadConfig,
    #[serde(default)]
    pub display: FileDisplayConfig,
    #[serde(default)]
    pub maintenance: FileMaintenanceConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileStorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileUploadConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDisplayConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileMaintenanceConfig {
    /// `off`, `report`, or `prune`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_sweep: Option<String>,
}

/// Environment-derived configuration values. Numeric settings stay raw
/// here and are parsed by the loader, which reports malformed values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<String>,
    pub upload_dir: Option<PathBuf>,
    pub data_file: Option<PathBuf>,
    pub public_dir: Option<PathBuf>,
    pub max_upload_bytes: Option<String>,
    pub display_utc_offset: Option<String>,
    pub startup_sweep: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: non_empty_var("PHOTOBOARD_CONFIG").map(PathBuf::from),
            server_host: non_empty_var("SERVER_HOST"),
            server_port: non_empty_var("SERVER_PORT"),
            upload_dir: non_empty_var("UPLOAD_DIR").map(PathBuf::from),
            data_file: non_empty_var("DATA_FILE").map(PathBuf::from),
            public_dir: non_empty_var("PUBLIC_DIR").map(PathBuf::from),
            max_upload_bytes: non_empty_var("MAX_UPLOAD_BYTES"),
            display_utc_offset: non_empty_var("DISPLAY_UTC_OFFSET"),
            startup_sweep: non_empty_var("STARTUP_SWEEP"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}
