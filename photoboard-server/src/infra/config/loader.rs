use once_cell::sync::Lazy;
use photoboard_core::SweepMode;
use std::{fs, path::PathBuf};
use thiserror::Error;

use super::{
    models::{
        Config, ConfigMetadata, DisplayConfig, MaintenanceConfig, ServerConfig,
        StorageConfig, UploadConfig, parse_utc_offset,
    },
    sources::{EnvConfig, FileConfig},
    validation::{self, ConfigWarnings},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("photoboard.toml"),
        PathBuf::from("config/photoboard.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
struct ConfigLoaderOptions {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env`, then compose defaults, the TOML file and the process
    /// environment (later sources win).
    ///
    /// An env file set with [`ConfigLoader::with_env_file`] must exist; the
    /// default `.env` lookup is optional.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => {
                dotenvy::from_path(path)?;
                true
            }
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let mut load = self.load_with_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Same as [`ConfigLoader::load`] with an explicit environment and no
    /// `.env` handling.
    pub fn load_with_env(&self, env: EnvConfig) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        self.compose_config(file_config, env, config_path)
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(found) => found.clone(),
                None => return Ok((None, None)),
            },
        };

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path)))
    }

    fn compose_config(
        &self,
        file_config: Option<FileConfig>,
        env: EnvConfig,
        config_path: Option<PathBuf>,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        if config_path.is_none() {
            warnings.push_with_hint(
                "No photoboard.toml detected; using defaults and environment variables",
                "Create photoboard.toml or set PHOTOBOARD_CONFIG to customise storage paths",
            );
        }

        let FileConfig {
            server: file_server,
            storage: file_storage,
            upload: file_upload,
            display: file_display,
            maintenance: file_maintenance,
        } = file_config.unwrap_or_default();

        let server_defaults = ServerConfig::default();
        let env_port = parse_env_number::<u16>("SERVER_PORT", env.server_port)?;
        let server = ServerConfig {
            host: env
                .server_host
                .or(file_server.host)
                .unwrap_or(server_defaults.host),
            port: env_port
                .or(file_server.port)
                .unwrap_or(server_defaults.port),
        };

        let storage_defaults = StorageConfig::default();
        let storage = StorageConfig {
            upload_dir: env
                .upload_dir
                .or(file_storage.upload_dir)
                .unwrap_or(storage_defaults.upload_dir),
            data_file: env
                .data_file
                .or(file_storage.data_file)
                .unwrap_or(storage_defaults.data_file),
            public_dir: env
                .public_dir
                .or(file_storage.public_dir)
                .unwrap_or(storage_defaults.public_dir),
        };

        let upload = UploadConfig {
            max_bytes: parse_env_number::<usize>("MAX_UPLOAD_BYTES", env.max_upload_bytes)?
                .or(file_upload.max_bytes)
                .unwrap_or(UploadConfig::default().max_bytes),
        };

        let display = match env.display_utc_offset.or(file_display.utc_offset) {
            Some(raw) => DisplayConfig {
                utc_offset: parse_utc_offset(&raw)
                    .ok_or(ConfigLoadError::InvalidUtcOffset { value: raw })?,
            },
            None => DisplayConfig::default(),
        };

        let maintenance = match env.startup_sweep.or(file_maintenance.startup_sweep) {
            Some(raw) => MaintenanceConfig {
                startup_sweep: parse_startup_sweep(&raw)?,
            },
            None => MaintenanceConfig::default(),
        };

        let config = Config {
            server,
            storage,
            upload,
            display,
            maintenance,
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded: false,
            },
        };

        warnings.extend(validation::collect_warnings(&config));

        Ok(ConfigLoad { config, warnings })
    }
}

fn parse_env_number<T: std::str::FromStr>(
    var: &'static str,
    raw: Option<String>,
) -> Result<Option<T>, ConfigLoadError> {
    raw.map(|value| {
        value
            .parse::<T>()
            .map_err(|_| ConfigLoadError::InvalidEnvValue { var, value })
    })
    .transpose()
}

fn parse_startup_sweep(raw: &str) -> Result<Option<SweepMode>, ConfigLoadError> {
    if raw.trim().eq_ignore_ascii_case("off") {
        return Ok(None);
    }
    raw.parse::<SweepMode>()
        .map(Some)
        .map_err(|_| ConfigLoadError::InvalidSweepMode {
            value: raw.to_string(),
        })
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid display UTC offset '{value}' (expected e.g. +09:00)")]
    InvalidUtcOffset { value: String },
    #[error("invalid startup sweep mode '{value}' (expected off, report, or prune)")]
    InvalidSweepMode { value: String },
    #[error("invalid value '{value}' for {var}")]
    InvalidEnvValue { var: &'static str, value: String },
    #[error("failed to load .env file")]
    EnvFile(#[from] dotenvy::Error),
}
