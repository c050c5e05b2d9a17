use super::models::Config;

const MIN_SENSIBLE_UPLOAD_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

pub fn collect_warnings(config: &Config) -> ConfigWarnings {
    let mut warnings = ConfigWarnings::default();

    if config.upload.max_bytes < MIN_SENSIBLE_UPLOAD_BYTES {
        warnings.push_with_hint(
            format!(
                "upload body limit is {} bytes; most photos will be rejected",
                config.upload.max_bytes
            ),
            "Raise MAX_UPLOAD_BYTES or upload.max_bytes",
        );
    }

    if !config.storage.public_dir.is_dir() {
        warnings.push_with_hint(
            format!(
                "public dir {} not found; stylesheets will 404",
                config.storage.public_dir.display()
            ),
            "Set PUBLIC_DIR or storage.public_dir to the directory holding styles/",
        );
    }

    if config.storage.upload_dir.starts_with(&config.storage.public_dir) {
        warnings.push(
            "upload dir sits inside the public dir; blobs are also served outside /uploads",
        );
    }

    warnings
}
