use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{FixedOffset, Offset, Utc};
use photoboard_core::SweepMode;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_DATA_FILE: &str = "data.json";
pub const DEFAULT_PUBLIC_DIR: &str = "public";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
/// Asia/Tokyo, the zone legacy data files were written in.
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 9 * 3600;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub display: DisplayConfig,
    pub maintenance: MaintenanceConfig,
    pub metadata: ConfigMetadata,
}

impl Config {
    /// Defaults with every storage path placed under `root`.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            storage: StorageConfig {
                upload_dir: root.join(DEFAULT_UPLOAD_DIR),
                data_file: root.join(DEFAULT_DATA_FILE),
                public_dir: root.join(DEFAULT_PUBLIC_DIR),
            },
            ..Self::default()
        }
    }

    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        self.storage.ensure_directories()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub data_file: PathBuf,
    pub public_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
        }
    }
}

impl StorageConfig {
    fn ensure_directories(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.upload_dir).with_context(|| {
            format!("failed to create upload dir {}", self.upload_dir.display())
        })?;
        if let Some(parent) = self
            .data_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create data dir {}", parent.display())
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub utc_offset: FixedOffset,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            utc_offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECS)
                .unwrap_or_else(|| Utc.fix()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    /// `None` skips the startup sweep.
    pub startup_sweep: Option<SweepMode>,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            startup_sweep: Some(SweepMode::Report),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

/// Parse `+09:00`, `-0530`, `+9`, `Z`, or `UTC` into a fixed offset.
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if !raw.is_ascii() {
        return None;
    }
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    if hours.is_empty() || hours.len() > 2 || minutes.is_empty() || minutes.len() > 2 {
        return None;
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
