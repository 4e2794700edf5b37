use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::api::{FlaskApi, GlowListeners};
use crate::config::{ConfigStore, FlaskConfig};
use crate::consumption::ConsumptionService;
use crate::error::PersistError;
use crate::hooks::HostHooks;
use crate::host::{Feedback, WidgetSink};
use crate::kernel::persist::{read_state, write_state, RecordSink, RecordSource};
use crate::kernel::{Clock, FlaskStateCache};

/// Owns the one state cache of a running system and wires every collaborator
/// to it.
pub struct FlaskRuntime {
    cache: Arc<FlaskStateCache>,
    config: Arc<ConfigStore>,
    hooks: HostHooks,
    api: FlaskApi,
}

impl FlaskRuntime {
    pub fn new(config: FlaskConfig, clock: Arc<dyn Clock>, feedback: Arc<dyn Feedback>, widget: Arc<dyn WidgetSink>) -> Self {
        Self::with_cache(Arc::new(FlaskStateCache::new(clock)), config, feedback, widget)
    }

    pub fn with_cache(
        cache: Arc<FlaskStateCache>,
        config: FlaskConfig,
        feedback: Arc<dyn Feedback>,
        widget: Arc<dyn WidgetSink>,
    ) -> Self {
        let config = Arc::new(ConfigStore::new(config));
        let consumption = Arc::new(ConsumptionService::new(cache.clone(), feedback));
        let glow = Arc::new(GlowListeners::default());

        let hooks = HostHooks::new(cache.clone(), config.clone(), consumption.clone(), widget, glow.clone());
        let api = FlaskApi::new(cache.clone(), config.clone(), consumption, glow);

        Self { cache, config, hooks, api }
    }

    pub fn cache(&self) -> &Arc<FlaskStateCache> {
        &self.cache
    }

    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    pub fn hooks(&self) -> &HostHooks {
        &self.hooks
    }

    pub fn api(&self) -> &FlaskApi {
        &self.api
    }

    /// Host save callback bound to this runtime's cache.
    pub fn save_callback(&self) -> impl Fn(&mut dyn RecordSink) -> Result<usize, PersistError> + Send + Sync + 'static {
        let cache = self.cache.clone();
        move |sink: &mut dyn RecordSink| cache.save(sink)
    }

    /// Host load callback bound to this runtime's cache.
    pub fn load_callback(&self) -> impl Fn(&mut dyn RecordSource) -> Result<usize, PersistError> + Send + Sync + 'static {
        let cache = self.cache.clone();
        move |source: &mut dyn RecordSource| cache.load(source)
    }

    /// Host revert callback: forgets every actor.
    pub fn revert_callback(&self) -> impl Fn() + Send + Sync + 'static {
        let cache = self.cache.clone();
        move || cache.clear()
    }

    pub fn save_to_file(&self, path: &Path) -> Result<usize, PersistError> {
        fs::write(path, write_state(&self.cache)?)?;
        info!("Saved flask state to {}", path.display());
        Ok(self.cache.len())
    }

    pub fn load_from_file(&self, path: &Path) -> Result<usize, PersistError> {
        let bytes = fs::read(path)?;
        read_state(&self.cache, &bytes)
    }
}
