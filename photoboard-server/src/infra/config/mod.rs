pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::{
    Config, ConfigMetadata, DisplayConfig, MaintenanceConfig, ServerConfig, StorageConfig,
    UploadConfig,
};
pub use validation::{ConfigWarning, ConfigWarnings};
