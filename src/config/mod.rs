//! Category tunables: the on-disk TOML file, its resolution against the host's
//! tag namespace, and the swappable snapshot every core operation reads.

pub mod loader;
pub mod settings;

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::error::ConfigError;
use crate::host::TagResolver;

pub use loader::{CategorySection, FileConfig, GeneralSection};
pub use settings::{CategorySettings, ExclusivityRule, FlaskConfig};

/// Holds the current configuration. Readers take an `Arc` snapshot and keep
/// using it for the whole operation even if a reload lands meanwhile.
pub struct ConfigStore {
    current: RwLock<Arc<FlaskConfig>>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(FlaskConfig::default())
    }
}

impl ConfigStore {
    pub fn new(config: FlaskConfig) -> Self {
        Self { current: RwLock::new(Arc::new(config)) }
    }

    pub fn snapshot(&self) -> Arc<FlaskConfig> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn replace(&self, config: FlaskConfig) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
    }

    /// Re-reads `path` (creating it with defaults if missing) and swaps the
    /// resolved result in wholesale. On error the previous snapshot stays.
    pub fn reload(&self, path: &Path, resolver: &dyn TagResolver) -> Result<Arc<FlaskConfig>, ConfigError> {
        let resolved = Arc::new(FileConfig::load_or_create(path)?.resolve(resolver));
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = resolved.clone();
        info!("Configuration reloaded from {}", path.display());
        Ok(resolved)
    }
}
